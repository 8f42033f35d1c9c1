use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

use crate::batch::Batch;
use crate::catalog::Catalog;
use crate::lookup::UnrecognizedCode;
use crate::synthesizer::{SynthesisError, Synthesizer};

/// Produces batches of synthetic traces.
///
/// Holds the one random source used for entity selection; it is seeded once
/// and shared by every call, including calls from several threads.
#[derive(Debug)]
pub struct Generator {
    catalog: Catalog,
    synthesizer: Synthesizer,
    rng: Mutex<StdRng>,
    warned: Mutex<HashSet<UnrecognizedCode>>,
}

impl Generator {
    /// Generator seeded from OS entropy
    pub fn new(catalog: Catalog) -> Self {
        Self::from_rng(catalog, StdRng::from_os_rng())
    }

    /// Generator with reproducible entity selection; ids and timestamps still vary
    pub fn with_seed(catalog: Catalog, seed: u64) -> Self {
        Self::from_rng(catalog, StdRng::seed_from_u64(seed))
    }

    fn from_rng(catalog: Catalog, rng: StdRng) -> Self {
        Self {
            catalog,
            synthesizer: Synthesizer::new(),
            rng: Mutex::new(rng),
            warned: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: Synthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Synthesize exactly `count` traces
    pub fn generate_batch(&self, count: usize) -> Result<Batch, SynthesisError> {
        let mut traces = Vec::with_capacity(count);

        for _ in 0..count {
            let (device, backend) = {
                let mut rng = self.rng.lock();
                (
                    self.catalog.pick_device(&mut *rng),
                    self.catalog.pick_backend(&mut *rng),
                )
            };

            let synthesized = self.synthesizer.synthesize(&device, &backend)?;
            for code in synthesized.unrecognized {
                self.report(code);
            }
            traces.push(synthesized.trace);
        }

        tracing::debug!(traces = traces.len(), "generated synthetic trace batch");
        Ok(Batch::new(traces))
    }

    /// Warn about a code the first time it is blanked out
    fn report(&self, code: UnrecognizedCode) {
        let mut warned = self.warned.lock();
        if !warned.contains(&code) {
            tracing::warn!(field = %code.field, code = %code.code, "{code}, emitting blank value");
            warned.insert(code);
        }
    }

    /// Codes that have been blanked out so far
    pub fn unrecognized_codes(&self) -> Vec<UnrecognizedCode> {
        self.warned.lock().iter().cloned().collect()
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(Catalog::atm_scenario())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BackendSystem, DeviceProfile};
    use crate::lookup::CodeField;
    use crate::synthesizer::CodePolicy;

    fn catalog_with_os(os_type: &str) -> Catalog {
        let base = Catalog::atm_scenario();
        let backends = vec![BackendSystem {
            os_type: os_type.to_string(),
            ..base.backends()[0].clone()
        }];
        Catalog::new(
            base.devices().to_vec(),
            backends,
            base.endpoints().to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn batch_holds_exactly_the_requested_count() {
        let generator = Generator::default();
        assert!(generator.generate_batch(0).unwrap().is_empty());
        assert_eq!(generator.generate_batch(1).unwrap().len(), 1);

        let batch = generator.generate_batch(25).unwrap();
        assert_eq!(batch.len(), 25);
        assert_eq!(batch.span_count(), 50);
        assert_eq!(batch.resource_spans().len(), 50);
    }

    #[test]
    fn same_seed_picks_same_entities() {
        let a = Generator::with_seed(Catalog::atm_scenario(), 99);
        let b = Generator::with_seed(Catalog::atm_scenario(), 99);

        let names = |g: &Generator| -> Vec<(String, String)> {
            g.generate_batch(50)
                .unwrap()
                .into_iter()
                .map(|t| (t.client.name, t.device.service_name().unwrap_or_default().to_string()))
                .collect()
        };

        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn unknown_codes_are_recorded_once() {
        let generator = Generator::with_seed(catalog_with_os("bsd"), 3);

        let batch = generator.generate_batch(10).unwrap();
        assert_eq!(batch.len(), 10);

        assert_eq!(
            generator.unrecognized_codes(),
            vec![UnrecognizedCode {
                field: CodeField::OsType,
                code: "bsd".to_string(),
            }]
        );
    }

    #[test]
    fn strict_generator_fails_the_batch() {
        let generator = Generator::with_seed(catalog_with_os("bsd"), 3)
            .with_synthesizer(Synthesizer::new().with_policy(CodePolicy::Reject));

        assert!(matches!(
            generator.generate_batch(3),
            Err(SynthesisError::UnrecognizedCode(_))
        ));
        assert!(generator.generate_batch(0).unwrap().is_empty());
    }

    #[test]
    fn custom_catalog_rows_are_used() {
        let device = DeviceProfile {
            id: 333,
            version: "v1.1".to_string(),
            name: "ATM-333-NY".to_string(),
            state_id: "NY".to_string(),
            serial_number: "atmxph-2023-333".to_string(),
            isp_network: "verizon-newyork".to_string(),
        };
        let base = Catalog::atm_scenario();
        let catalog = Catalog::new(
            vec![device],
            base.backends().to_vec(),
            vec!["api/v3/deposit".to_string()],
        )
        .unwrap();

        let batch = Generator::new(catalog).generate_batch(5).unwrap();
        for trace in batch.traces() {
            assert_eq!(trace.device.service_name(), Some("ATM-333-NY"));
            assert_eq!(trace.client.name, "Make Deposit");
            assert_eq!(trace.server.name, "api/v3/deposit");
        }
    }
}
