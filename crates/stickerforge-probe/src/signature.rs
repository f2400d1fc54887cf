//! Magic-number signature table
//!
//! Each [`Signature`] maps a leading byte prefix either directly to a
//! [`FileType`] or to a discriminator that inspects further bytes. Prefixes
//! that several containers share (RIFF, EBML) go through a discriminator;
//! when it returns `None` matching continues with the next, shorter
//! signature. ISO-BMFF files lead with a variable box size instead of a fixed
//! prefix, so [`iso_bmff_brand`] is checked ahead of the table.

/// A detected file classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileType {
    /// Canonical file extension without the dot
    pub extension: &'static str,
    /// MIME type
    pub mime_type: &'static str,
}

impl FileType {
    pub const fn new(extension: &'static str, mime_type: &'static str) -> Self {
        Self {
            extension,
            mime_type,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.extension, self.mime_type)
    }
}

pub const PNG: FileType = FileType::new("png", "image/png");
pub const JPEG: FileType = FileType::new("jpg", "image/jpeg");
pub const GIF: FileType = FileType::new("gif", "image/gif");
pub const WEBP: FileType = FileType::new("webp", "image/webp");
pub const BMP: FileType = FileType::new("bmp", "image/bmp");
pub const TIFF: FileType = FileType::new("tif", "image/tiff");
pub const ICO: FileType = FileType::new("ico", "image/x-icon");
pub const HEIC: FileType = FileType::new("heic", "image/heic");
pub const AVIF: FileType = FileType::new("avif", "image/avif");
pub const MP4: FileType = FileType::new("mp4", "video/mp4");
pub const MOV: FileType = FileType::new("mov", "video/quicktime");
pub const THREE_GP: FileType = FileType::new("3gp", "video/3gpp");
pub const WEBM: FileType = FileType::new("webm", "video/webm");
pub const MKV: FileType = FileType::new("mkv", "video/x-matroska");
pub const AVI: FileType = FileType::new("avi", "video/x-msvideo");
pub const M4A: FileType = FileType::new("m4a", "audio/mp4");
pub const MP3: FileType = FileType::new("mp3", "audio/mpeg");
pub const WAV: FileType = FileType::new("wav", "audio/wav");
pub const OGG: FileType = FileType::new("ogg", "audio/ogg");
pub const FLAC: FileType = FileType::new("flac", "audio/flac");
pub const PDF: FileType = FileType::new("pdf", "application/pdf");
pub const ZIP: FileType = FileType::new("zip", "application/zip");
pub const GZIP: FileType = FileType::new("gz", "application/gzip");
pub const SEVEN_ZIP: FileType = FileType::new("7z", "application/x-7z-compressed");
pub const HTML: FileType = FileType::new("html", "text/html");
pub const XML: FileType = FileType::new("xml", "application/xml");
pub const TEXT: FileType = FileType::new("txt", "text/plain");
pub const BINARY: FileType = FileType::new("bin", "application/octet-stream");

/// How a matched prefix is turned into a [`FileType`]
#[derive(Clone, Copy)]
pub enum Resolution {
    /// The prefix alone identifies the type
    Direct(FileType),
    /// The prefix is shared; the function inspects the whole buffer
    Discriminate(fn(&[u8]) -> Option<FileType>),
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Direct(ft) => f.debug_tuple("Direct").field(ft).finish(),
            Resolution::Discriminate(_) => f.write_str("Discriminate(..)"),
        }
    }
}

/// One entry of the signature table
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub magic: &'static [u8],
    pub resolution: Resolution,
}

impl Signature {
    const fn direct(magic: &'static [u8], file_type: FileType) -> Self {
        Self {
            magic,
            resolution: Resolution::Direct(file_type),
        }
    }

    const fn discriminate(magic: &'static [u8], f: fn(&[u8]) -> Option<FileType>) -> Self {
        Self {
            magic,
            resolution: Resolution::Discriminate(f),
        }
    }

    /// Resolve `data` against this signature.
    pub fn resolve(&self, data: &[u8]) -> Option<FileType> {
        if !data.starts_with(self.magic) {
            return None;
        }
        match self.resolution {
            Resolution::Direct(ft) => Some(ft),
            Resolution::Discriminate(f) => f(data),
        }
    }
}

/// Known signatures, ordered longest prefix first.
pub static SIGNATURES: &[Signature] = &[
    // 8 bytes
    Signature::direct(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], PNG),
    // 6 bytes
    Signature::direct(b"GIF87a", GIF),
    Signature::direct(b"GIF89a", GIF),
    Signature::direct(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C], SEVEN_ZIP),
    // 4 bytes
    Signature::discriminate(b"RIFF", riff_form),
    Signature::discriminate(&[0x1A, 0x45, 0xDF, 0xA3], ebml_doctype),
    Signature::direct(&[0x00, 0x00, 0x01, 0x00], ICO),
    Signature::direct(&[0x49, 0x49, 0x2A, 0x00], TIFF),
    Signature::direct(&[0x4D, 0x4D, 0x00, 0x2A], TIFF),
    Signature::direct(b"%PDF", PDF),
    Signature::direct(&[0x50, 0x4B, 0x03, 0x04], ZIP),
    Signature::direct(b"OggS", OGG),
    Signature::direct(b"fLaC", FLAC),
    // 3 bytes
    Signature::direct(&[0xFF, 0xD8, 0xFF], JPEG),
    Signature::direct(b"ID3", MP3),
    // 2 bytes
    Signature::direct(b"BM", BMP),
    Signature::direct(&[0x1F, 0x8B], GZIP),
    Signature::direct(&[0xFF, 0xFB], MP3),
    Signature::direct(&[0xFF, 0xF3], MP3),
    Signature::direct(&[0xFF, 0xF2], MP3),
];

/// RIFF containers carry their form type at bytes 8..12.
fn riff_form(data: &[u8]) -> Option<FileType> {
    match data.get(8..12)? {
        b"WEBP" => Some(WEBP),
        b"WAVE" => Some(WAV),
        b"AVI " => Some(AVI),
        _ => None,
    }
}

/// Matroska and WebM share the EBML header; the DocType string tells them apart.
fn ebml_doctype(data: &[u8]) -> Option<FileType> {
    let head = &data[..data.len().min(64)];
    if head.windows(4).any(|w| w == b"webm") {
        Some(WEBM)
    } else {
        Some(MKV)
    }
}

/// ISO base media files start with a box size followed by `ftyp` and a brand.
/// The size is not inspected.
pub fn iso_bmff_brand(data: &[u8]) -> Option<FileType> {
    if data.get(4..8)? != b"ftyp" {
        return None;
    }
    let brand = data.get(8..12)?;
    let file_type = match brand {
        b"qt  " => MOV,
        b"M4A " | b"M4B " => M4A,
        b"heic" | b"heix" | b"mif1" | b"msf1" => HEIC,
        b"avif" | b"avis" => AVIF,
        _ if brand.starts_with(b"3g") => THREE_GP,
        _ => MP4,
    };
    Some(file_type)
}
