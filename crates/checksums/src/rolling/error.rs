use core::fmt;

/// Errors surfaced by the rolling checksum when sliding the window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RollingError {
    /// The checksum has not been seeded with an initial window yet.
    EmptyWindow,
    /// The window length exceeds the 32-bit range the algorithm supports.
    WindowTooLarge {
        /// Length of the offending window in bytes.
        len: usize,
    },
}

impl fmt::Display for RollingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollingError::EmptyWindow => {
                write!(f, "rolling checksum window is empty")
            }
            RollingError::WindowTooLarge { len } => {
                write!(f, "rolling checksum window of {len} bytes exceeds 32 bits")
            }
        }
    }
}

impl std::error::Error for RollingError {}
