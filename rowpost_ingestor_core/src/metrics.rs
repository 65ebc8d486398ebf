use rowpost_observability::{Counter, UpDownCounter};

#[derive(Clone)]
pub struct IngestionMetrics {
    pub persisted_records: Counter<u64>,
    pub failed_records: Counter<u64>,
    pub in_flight_records: UpDownCounter<i64>,
}

impl Default for IngestionMetrics {
    fn default() -> Self {
        let meter = rowpost_observability::meter("ingestion");
        Self {
            persisted_records: meter
                .u64_counter("ingestion.records.persisted")
                .with_unit("{record}")
                .with_description("number of records written to the store")
                .build(),
            failed_records: meter
                .u64_counter("ingestion.records.failed")
                .with_unit("{record}")
                .with_description("number of records the store failed to write")
                .build(),
            in_flight_records: meter
                .i64_up_down_counter("ingestion.records.in_flight")
                .with_unit("{record}")
                .with_description("number of store writes currently in flight")
                .build(),
        }
    }
}
