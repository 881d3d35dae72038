//! Display geometry and converter range used to derive per-division quantities.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfiguration {
    /// Number of distinct ADC codes spanning the full display height. `65536` for 16-bit codes.
    pub full_scale: u32,
    pub vertical_divisions: u32,
    pub horizontal_divisions: u32,
}

impl Default for StoreConfiguration {
    fn default() -> Self {
        Self {
            full_scale: 1 << 16, // INT16 transfer format
            vertical_divisions: 8,
            horizontal_divisions: 10,
        }
    }
}

impl StoreConfiguration {
    /// Configuration for a converter of `bits` resolution with the default display grid.
    pub fn with_resolution(bits: u32) -> Self {
        assert!(bits > 0 && bits < 32);
        Self {
            full_scale: 1 << bits,
            ..Default::default()
        }
    }

    pub(crate) fn full_scale(&self) -> f64 {
        self.full_scale as f64
    }
}
