use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Invalid cp info tag: {0}")]
    InvalidCpInfoTag(u8),
    #[error("Invalid constant pool index {index}: expected {expected}")]
    InvalidConstantPoolIndex { index: u16, expected: &'static str },
    #[error("Malformed modified UTF-8 at constant pool slot {0}")]
    MalformedUtf8(u16),
    #[error("String of {0} bytes does not fit a CONSTANT_Utf8_info")]
    Utf8TooLong(usize),
    #[error("Attribute body truncated at offset {offset}")]
    TruncatedAttributeBody { offset: u64 },
    #[error("Attribute body of {0} bytes does not fit a u4 length")]
    AttributeTooLarge(usize),
    #[error("Table of {0} entries does not fit a u2 count")]
    TableTooLarge(usize),
    #[error("Constant pool is full")]
    ConstantPoolOverflow,
}
