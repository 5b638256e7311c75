#[derive(Debug, PartialEq, Eq)]
/// Bit-bang bus master hardware errors
pub enum BitBangError<E> {
    /// The 1-Wire data line failed.
    Data(E),
    /// The power-control line failed.
    Power(E),
}

impl<E> From<E> for BitBangError<E> {
    fn from(value: E) -> Self {
        Self::Data(value)
    }
}
