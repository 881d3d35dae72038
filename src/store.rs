//! Per-channel storage of raw captures and their conversion into physical units.

use indexmap::IndexMap;

use crate::{ChannelId, Error, Preamble, Result, StoreConfiguration};

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    pub preamble: Preamble,
    pub raw: Vec<i64>,
}

impl ChannelRecord {
    /// Volts spanned by one vertical division when the full converter range fills the display.
    pub fn volts_per_div(&self, config: &StoreConfiguration) -> f64 {
        config.full_scale() * self.preamble.y_increment / config.vertical_divisions as f64
    }

    /// Voltage at the vertical center of the display.
    pub fn offset(&self, config: &StoreConfiguration) -> f64 {
        let Preamble { y_increment, y_origin, y_reference, .. } = self.preamble;
        (config.full_scale() / 2.0 - y_reference) * y_increment + y_origin
    }

    /// Seconds spanned by one horizontal division when the capture fills the display.
    pub fn sec_per_div(&self, config: &StoreConfiguration) -> f64 {
        self.preamble.points * self.preamble.x_increment / config.horizontal_divisions as f64
    }

    /// Time of the horizontal center of the display.
    pub fn delay(&self) -> f64 {
        let Preamble { points, x_increment, x_origin, x_reference, .. } = self.preamble;
        (points / 2.0 - x_reference) * x_increment + x_origin
    }

    /// Time of each sample relative to the first sample in the buffer.
    pub fn time(&self) -> impl Iterator<Item = f64> + '_ {
        let x_increment = self.preamble.x_increment;
        (0..self.raw.len()).map(move |index| x_increment * index as f64)
    }

    /// Voltage of each sample.
    pub fn volts(&self) -> impl Iterator<Item = f64> + '_ {
        let Preamble { y_increment, y_origin, y_reference, .. } = self.preamble;
        self.raw.iter().map(move |&code| y_increment * (code as f64 - y_reference) + y_origin)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaveformStore {
    config: StoreConfiguration,
    channels: IndexMap<ChannelId, ChannelRecord>,
}

impl WaveformStore {
    pub fn new() -> WaveformStore {
        Self::with_configuration(StoreConfiguration::default())
    }

    pub fn with_configuration(config: StoreConfiguration) -> WaveformStore {
        WaveformStore { config, channels: IndexMap::new() }
    }

    pub fn configuration(&self) -> &StoreConfiguration {
        &self.config
    }

    /// Store a capture of `channel`. If `channel` was added before, its record is replaced and it
    /// keeps its position in [`Self::channels`].
    ///
    /// The length of `raw` is not checked against the declared number of points.
    pub fn insert(&mut self, channel: ChannelId, preamble: Preamble, raw: Vec<i64>) {
        log::debug!("insert({}) points={} samples={} count={}",
            channel, preamble.points, raw.len(), preamble.count);
        if raw.len() as f64 != preamble.points {
            log::warn!("channel {} declares {} points but holds {} samples",
                channel, preamble.points, raw.len());
        }
        if self.channels.insert(channel, ChannelRecord { preamble, raw }).is_some() {
            log::debug!("replaced previous capture of channel {}", channel);
        }
    }

    /// Parse `preamble` and store it with `raw` under `channel`.
    ///
    /// Nothing is stored if the preamble is malformed.
    pub fn add_channel<S: AsRef<str>>(&mut self, channel: ChannelId, preamble: &[S], raw: Vec<i64>)
            -> Result<()> {
        let preamble = Preamble::parse_fields(preamble)?;
        self.insert(channel, preamble, raw);
        Ok(())
    }

    /// Identifiers of all added channels, in the order they were first added.
    pub fn channels(&self) -> impl ExactSizeIterator<Item = ChannelId> + '_ {
        self.channels.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn contains(&self, channel: ChannelId) -> bool {
        self.channels.contains_key(&channel)
    }

    pub fn channel(&self, channel: ChannelId) -> Result<&ChannelRecord> {
        self.channels.get(&channel).ok_or(Error::MissingChannel(channel))
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = (ChannelId, &ChannelRecord)> + '_ {
        self.channels.iter().map(|(&channel, record)| (channel, record))
    }

    pub fn preamble(&self, channel: ChannelId) -> Result<&Preamble> {
        Ok(&self.channel(channel)?.preamble)
    }

    pub fn raw(&self, channel: ChannelId) -> Result<&[i64]> {
        Ok(&self.channel(channel)?.raw)
    }

    pub fn volts_per_div(&self, channel: ChannelId) -> Result<f64> {
        Ok(self.channel(channel)?.volts_per_div(&self.config))
    }

    pub fn offset(&self, channel: ChannelId) -> Result<f64> {
        Ok(self.channel(channel)?.offset(&self.config))
    }

    pub fn sec_per_div(&self, channel: ChannelId) -> Result<f64> {
        Ok(self.channel(channel)?.sec_per_div(&self.config))
    }

    pub fn delay(&self, channel: ChannelId) -> Result<f64> {
        Ok(self.channel(channel)?.delay())
    }

    /// Sample times in seconds, starting at zero for the first sample.
    pub fn time(&self, channel: ChannelId) -> Result<Vec<f64>> {
        Ok(self.channel(channel)?.time().collect())
    }

    /// Sample voltages in volts.
    pub fn ch(&self, channel: ChannelId) -> Result<Vec<f64>> {
        Ok(self.channel(channel)?.volts().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn preamble(points: f64, x_increment: f64, y_increment: f64, y_origin: f64, y_reference: f64)
            -> Preamble {
        Preamble::from_values(&[
            1.0, 1.0, points, 1.0, x_increment, 0.0, 0.0, y_increment, y_origin, y_reference
        ]).unwrap()
    }

    #[test]
    fn test_scale_and_origin() {
        let mut store = WaveformStore::new();
        store.add_channel(1, &["1", "1", "4", "1", "0.5", "0", "0", "2", "0", "0"],
            vec![0, 100, 200, 300]).unwrap();
        assert_eq!(store.time(1).unwrap(), [0.0, 0.5, 1.0, 1.5]);
        assert_eq!(store.ch(1).unwrap(), [0.0, 200.0, 400.0, 600.0]);
    }

    #[test]
    fn test_reference_subtracted() {
        let mut store = WaveformStore::new();
        store.add_channel(1, &["1", "1", "4", "1", "1", "0", "0", "1", "10", "5"],
            vec![5, 15, 25, 35]).unwrap();
        assert_eq!(store.ch(1).unwrap(), [10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_missing_channel() {
        let mut store = WaveformStore::new();
        store.insert(1, preamble(4.0, 1.0, 1.0, 0.0, 0.0), vec![0; 4]);
        assert!(matches!(store.ch(2), Err(Error::MissingChannel(2))));
        assert!(matches!(store.time(2), Err(Error::MissingChannel(2))));
        assert!(matches!(store.volts_per_div(2), Err(Error::MissingChannel(2))));
        assert!(matches!(store.offset(2), Err(Error::MissingChannel(2))));
        assert!(matches!(store.sec_per_div(2), Err(Error::MissingChannel(2))));
        assert!(matches!(store.delay(2), Err(Error::MissingChannel(2))));
    }

    #[test]
    fn test_malformed_preamble_not_added() {
        let mut store = WaveformStore::new();
        let error = store.add_channel(1, &["1"; 9], vec![0; 4]).unwrap_err();
        assert!(matches!(error, Error::MalformedPreamble { .. }));
        assert_eq!(store.channels().count(), 0);
        assert!(!store.contains(1));
        assert!(store.is_empty());
    }

    #[test]
    fn test_division_quantities() {
        let mut store = WaveformStore::new();
        store.add_channel(3, &["1", "0", "1000", "8", "1e-6", "-2e-4", "100", "1e-3", "0.5", "12"],
            vec![0; 1000]).unwrap();
        assert_eq!(store.volts_per_div(3).unwrap(), 65536.0 * 1e-3 / 8.0);
        assert_eq!(store.offset(3).unwrap(), (32768.0 - 12.0) * 1e-3 + 0.5);
        assert_eq!(store.sec_per_div(3).unwrap(), 1000.0 * 1e-6 / 10.0);
        assert_eq!(store.delay(3).unwrap(), (500.0 - 100.0) * 1e-6 + -2e-4);
        assert_eq!(store.preamble(3).unwrap().count, 8);
    }

    #[test]
    fn test_configured_full_scale() {
        let mut store = WaveformStore::with_configuration(StoreConfiguration::with_resolution(8));
        store.insert(1, preamble(4.0, 1.0, 0.5, 0.0, 0.0), vec![0; 4]);
        assert_eq!(store.volts_per_div(1).unwrap(), 256.0 * 0.5 / 8.0);
        assert_eq!(store.offset(1).unwrap(), 128.0 * 0.5);
    }

    #[test]
    fn test_reinsert_replaces() {
        let mut store = WaveformStore::new();
        store.insert(2, preamble(2.0, 1.0, 1.0, 0.0, 0.0), vec![1, 2]);
        store.insert(1, preamble(2.0, 1.0, 1.0, 0.0, 0.0), vec![3, 4]);
        store.insert(2, preamble(3.0, 1.0, 2.0, 0.0, 0.0), vec![5, 6, 7]);
        assert_eq!(store.channels().collect::<Vec<_>>(), [2, 1]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.raw(2).unwrap(), [5, 6, 7]);
        assert_eq!(store.ch(2).unwrap(), [10.0, 12.0, 14.0]);
    }

    #[test]
    fn test_stores_are_independent() {
        let mut first = WaveformStore::new();
        let second = WaveformStore::new();
        first.insert(1, preamble(1.0, 1.0, 1.0, 0.0, 0.0), vec![0]);
        assert!(first.contains(1));
        assert!(!second.contains(1));
    }

    #[test]
    fn test_unvalidated_buffer_length() {
        let mut store = WaveformStore::new();
        store.insert(1, preamble(10.0, 0.25, 1.0, 0.0, 0.0), vec![1, 2, 3]);
        assert_eq!(store.time(1).unwrap(), [0.0, 0.25, 0.5]);
        assert_eq!(store.ch(1).unwrap().len(), 3);
    }

    proptest! {
        #[test]
        fn prop_derived_arrays(
            raw in prop::collection::vec(-32768i64..32768, 0..64),
            x_increment in 1e-12f64..1.0,
            y_increment in 1e-6f64..1.0,
            y_origin in -10.0f64..10.0,
            y_reference in -100.0f64..100.0,
        ) {
            let mut store = WaveformStore::new();
            let preamble = preamble(raw.len() as f64, x_increment, y_increment, y_origin, y_reference);
            store.insert(7, preamble, raw.clone());

            let time = store.time(7).unwrap();
            let volts = store.ch(7).unwrap();
            prop_assert_eq!(time.len(), raw.len());
            prop_assert_eq!(volts.len(), raw.len());
            if let Some(&first) = time.first() {
                prop_assert_eq!(first, 0.0);
            }
            for (index, &code) in raw.iter().enumerate() {
                prop_assert_eq!(volts[index], y_increment * (code as f64 - y_reference) + y_origin);
            }
            prop_assert_eq!(&store.time(7).unwrap(), &time);
            prop_assert_eq!(&store.ch(7).unwrap(), &volts);
        }

        #[test]
        fn prop_division_quantities_ignore_samples(
            first in prop::collection::vec(any::<i16>(), 1..32),
            second in prop::collection::vec(any::<i16>(), 1..32),
            y_increment in 1e-6f64..1.0,
        ) {
            let mut store = WaveformStore::new();
            let preamble = preamble(16.0, 1e-3, y_increment, 0.1, 3.0);
            store.insert(1, preamble, first.into_iter().map(i64::from).collect());
            store.insert(2, preamble, second.into_iter().map(i64::from).collect());
            prop_assert_eq!(store.volts_per_div(1).unwrap(), store.volts_per_div(2).unwrap());
            prop_assert_eq!(store.offset(1).unwrap(), store.offset(2).unwrap());
            prop_assert_eq!(store.sec_per_div(1).unwrap(), store.sec_per_div(2).unwrap());
            prop_assert_eq!(store.delay(1).unwrap(), store.delay(2).unwrap());
            prop_assert_eq!(store.volts_per_div(1).unwrap(), 65536.0 * y_increment / 8.0);
        }
    }
}
