//! NPY file header definition.

use crate::error::{Result, Sv3dIoError};

/// Magic bytes at the start of every .npy file.
pub const NPY_MAGIC: [u8; 6] = *b"\x93NUMPY";

/// Header blocks are padded so the data starts on this alignment.
pub const HEADER_ALIGN: usize = 64;

/// Element types we decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpyDtype {
    /// Little-endian f32 (`<f4`).
    F32,
    /// Little-endian f64 (`<f8`).
    F64,
    /// Unsigned byte (`|u1`).
    U8,
    /// Boolean byte (`|b1`).
    Bool,
    /// Little-endian i32 (`<i4`).
    I32,
    /// Little-endian i64 (`<i8`).
    I64,
}

impl NpyDtype {
    /// Parse a numpy type descriptor.
    pub fn from_descr(descr: &str) -> Result<Self> {
        match descr {
            "<f4" => Ok(NpyDtype::F32),
            "<f8" => Ok(NpyDtype::F64),
            "|u1" | "<u1" => Ok(NpyDtype::U8),
            "|b1" => Ok(NpyDtype::Bool),
            "<i4" => Ok(NpyDtype::I32),
            "<i8" => Ok(NpyDtype::I64),
            other => Err(Sv3dIoError::UnsupportedDtype {
                descr: other.to_string(),
            }),
        }
    }

    /// The canonical descriptor written to headers.
    pub fn descr(&self) -> &'static str {
        match self {
            NpyDtype::F32 => "<f4",
            NpyDtype::F64 => "<f8",
            NpyDtype::U8 => "|u1",
            NpyDtype::Bool => "|b1",
            NpyDtype::I32 => "<i4",
            NpyDtype::I64 => "<i8",
        }
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            NpyDtype::U8 | NpyDtype::Bool => 1,
            NpyDtype::F32 | NpyDtype::I32 => 4,
            NpyDtype::F64 | NpyDtype::I64 => 8,
        }
    }
}

/// Parsed NPY header.
///
/// Layout:
/// - Bytes 0-5: Magic "\x93NUMPY"
/// - Byte 6-7: major, minor version
/// - Header length: u16 LE (v1) or u32 LE (v2, v3)
/// - ASCII dict `{'descr': ..., 'fortran_order': ..., 'shape': (...), }`,
///   space padded and newline terminated to a multiple of 64 bytes
#[derive(Debug, Clone, PartialEq)]
pub struct NpyHeader {
    /// Element type.
    pub dtype: NpyDtype,
    /// Whether data is stored column-major.
    pub fortran_order: bool,
    /// Array shape.
    pub shape: Vec<usize>,
}

impl NpyHeader {
    /// Create a C-ordered header.
    pub fn new(dtype: NpyDtype, shape: Vec<usize>) -> Self {
        Self {
            dtype,
            fortran_order: false,
            shape,
        }
    }

    /// Number of elements implied by the shape, `None` on overflow.
    pub fn num_elements(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
    }

    /// Payload size in bytes, `None` on overflow.
    pub fn data_len(&self) -> Option<usize> {
        self.num_elements()?.checked_mul(self.dtype.size())
    }

    /// Size of the preamble (magic, version, length field) for a version.
    pub fn preamble_len(major: u8) -> Result<usize> {
        match major {
            1 => Ok(10),
            2 | 3 => Ok(12),
            _ => Err(Sv3dIoError::InvalidFormat {
                message: format!("unsupported npy version {}", major),
            }),
        }
    }

    /// Parse the ASCII header dictionary.
    pub fn parse_dict(dict: &str) -> Result<Self> {
        let descr = quoted_value(dict, "descr")?;
        let dtype = NpyDtype::from_descr(descr)?;

        let fortran_order = match raw_value(dict, "fortran_order")? {
            v if v.starts_with("True") => true,
            v if v.starts_with("False") => false,
            _ => {
                return Err(Sv3dIoError::InvalidFormat {
                    message: "fortran_order is neither True nor False".to_string(),
                })
            }
        };

        let shape_raw = raw_value(dict, "shape")?;
        let open = shape_raw.find('(');
        let close = shape_raw.find(')');
        let inner = match (open, close) {
            (Some(o), Some(c)) if o < c => &shape_raw[o + 1..c],
            _ => {
                return Err(Sv3dIoError::InvalidFormat {
                    message: "shape is not a tuple".to_string(),
                })
            }
        };
        let shape = inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.trim_end_matches('L')
                    .parse::<usize>()
                    .map_err(|_| Sv3dIoError::InvalidFormat {
                        message: format!("bad shape entry '{}'", s),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            dtype,
            fortran_order,
            shape,
        })
    }

    /// Serialize to a complete version 1.0 header block.
    pub fn to_bytes(&self) -> Vec<u8> {
        let shape = match self.shape.len() {
            1 => format!("({},)", self.shape[0]),
            _ => format!(
                "({})",
                self.shape
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        let mut dict = format!(
            "{{'descr': '{}', 'fortran_order': {}, 'shape': {}, }}",
            self.dtype.descr(),
            if self.fortran_order { "True" } else { "False" },
            shape
        );

        let preamble = 10;
        let unpadded = preamble + dict.len() + 1;
        let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
        dict.push_str(&" ".repeat(padding));
        dict.push('\n');

        let mut bytes = Vec::with_capacity(preamble + dict.len());
        bytes.extend_from_slice(&NPY_MAGIC);
        bytes.push(1);
        bytes.push(0);
        bytes.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        bytes.extend_from_slice(dict.as_bytes());
        bytes
    }
}

fn raw_value<'a>(dict: &'a str, key: &str) -> Result<&'a str> {
    let needle = format!("'{}':", key);
    let start = dict
        .find(&needle)
        .ok_or_else(|| Sv3dIoError::InvalidFormat {
            message: format!("header has no '{}' entry", key),
        })?;
    Ok(dict[start + needle.len()..].trim_start())
}

fn quoted_value<'a>(dict: &'a str, key: &str) -> Result<&'a str> {
    let rest = raw_value(dict, key)?;
    let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"');
    let quote = quote.ok_or_else(|| Sv3dIoError::InvalidFormat {
        message: format!("'{}' is not a string", key),
    })?;
    let body = &rest[1..];
    let end = body.find(quote).ok_or_else(|| Sv3dIoError::InvalidFormat {
        message: format!("unterminated string for '{}'", key),
    })?;
    Ok(&body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numpy_written_dict() {
        let dict = "{'descr': '<f4', 'fortran_order': False, 'shape': (2048, 3), }";
        let header = NpyHeader::parse_dict(dict).unwrap();
        assert_eq!(header.dtype, NpyDtype::F32);
        assert!(!header.fortran_order);
        assert_eq!(header.shape, vec![2048, 3]);
        assert_eq!(header.num_elements(), Some(6144));
        assert_eq!(header.data_len(), Some(6144 * 4));
    }

    #[test]
    fn test_parse_one_dimensional_and_scalar() {
        let header =
            NpyHeader::parse_dict("{'descr': '|b1', 'fortran_order': False, 'shape': (5,), }")
                .unwrap();
        assert_eq!(header.shape, vec![5]);

        let header =
            NpyHeader::parse_dict("{'descr': '<f8', 'fortran_order': False, 'shape': (), }")
                .unwrap();
        assert!(header.shape.is_empty());
        assert_eq!(header.num_elements(), Some(1));
    }

    #[test]
    fn test_oversized_shape_overflows() {
        let header = NpyHeader::new(NpyDtype::F32, vec![1 << 62, 8]);
        assert_eq!(header.num_elements(), None);

        let header = NpyHeader::new(NpyDtype::F64, vec![usize::MAX / 4]);
        assert!(header.num_elements().is_some());
        assert_eq!(header.data_len(), None);
    }

    #[test]
    fn test_header_block_is_aligned() {
        let header = NpyHeader::new(NpyDtype::F32, vec![32, 32, 32]);
        let bytes = header.to_bytes();
        assert_eq!(bytes.len() % HEADER_ALIGN, 0);
        assert_eq!(&bytes[0..6], &NPY_MAGIC);
        assert_eq!(*bytes.last().unwrap(), b'\n');

        let dict = std::str::from_utf8(&bytes[10..]).unwrap();
        assert_eq!(NpyHeader::parse_dict(dict).unwrap(), header);
    }

    #[test]
    fn test_unsupported_dtype() {
        let err = NpyHeader::parse_dict("{'descr': '>f4', 'fortran_order': False, 'shape': (1,), }")
            .unwrap_err();
        assert_eq!(
            err,
            Sv3dIoError::UnsupportedDtype {
                descr: ">f4".to_string()
            }
        );
    }
}
