//! End-to-end batch runs against a scripted geocoder and against the real
//! dispatcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use geobatch::batch::{BatchJob, BatchPipeline, ProcessingState, ProgressCallback};
use geobatch::config::ProviderCredentials;
use geobatch::dispatch::{Geocode, GeocodeDispatcher, GeocodeError};
use geobatch::policy::RatePolicy;
use geobatch::provider::{AsyncReqwestClient, GeocodeOutcome, ProviderId};
use geobatch::sheet::{find_address_column, read_rows, write_rows, CellValue};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Geocoder answering from a fixed address table.
struct TableGeocoder {
    table: HashMap<&'static str, GeocodeOutcome>,
    calls: AtomicUsize,
}

impl TableGeocoder {
    fn new(entries: Vec<(&'static str, GeocodeOutcome)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Geocode for TableGeocoder {
    async fn geocode(
        &self,
        address: &str,
        _provider: ProviderId,
    ) -> Result<GeocodeOutcome, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .table
            .get(address)
            .cloned()
            .unwrap_or_else(GeocodeOutcome::no_results))
    }
}

const SHEET: &str = "\
No,Nama Toko,Alamat
1,Toko Maju,Jl. Merdeka 10
2,Toko Jaya,Jl. Tidak Ada
3,Toko Baru,
";

#[tokio::test(start_paused = true)]
async fn test_three_row_batch() {
    let rows = read_rows(SHEET.as_bytes()).unwrap();
    let column = find_address_column(&rows).unwrap();
    assert_eq!(column, "Alamat");

    let geocoder = TableGeocoder::new(vec![(
        "Jl. Merdeka 10",
        GeocodeOutcome::found(1.0, 2.0, "Jalan Merdeka 10, Bandung"),
    )]);

    let last_state = Arc::new(Mutex::new(ProcessingState::default()));
    let sink = Arc::clone(&last_state);
    let callback: ProgressCallback = Box::new(move |state| *sink.lock() = state.clone());

    let pipeline = BatchPipeline::new(geocoder, RatePolicy::default());
    let report = pipeline
        .run_with(
            BatchJob::new(rows, column, ProviderId::LocationIq),
            Some(callback),
            CancellationToken::new(),
        )
        .await;

    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.rows[0].status(), Some("Success"));
    assert_eq!(report.rows[0].latitude(), Some(1.0));
    assert_eq!(report.rows[0].longitude(), Some(2.0));
    assert_eq!(report.rows[1].status(), Some("No results found"));
    assert_eq!(report.rows[2].status(), Some("No address"));

    assert_eq!(report.errors(), ["Row 2: No results found"]);
    assert_eq!(report.state.current, 3);
    assert_eq!(pipeline.geocoder().calls.load(Ordering::SeqCst), 2);

    let observed = last_state.lock().clone();
    assert_eq!(observed.current, 3);
    assert!(!observed.is_processing);

    let mut out = Vec::new();
    write_rows(&mut out, &report.rows).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(
        lines[0],
        "No,Nama Toko,Alamat,latitude,longitude,formatted_address,status"
    );
    assert_eq!(
        lines[1],
        "1,Toko Maju,Jl. Merdeka 10,1,2,\"Jalan Merdeka 10, Bandung\",Success"
    );
    assert_eq!(lines[3], "3,Toko Baru,,,,,No address");
}

#[tokio::test(start_paused = true)]
async fn test_unconfigured_provider_marks_rows() {
    // No credentials: the dispatcher answers before any request is built
    let client = AsyncReqwestClient::with_timeout(1).unwrap();
    let dispatcher = GeocodeDispatcher::new(client, ProviderCredentials::new());
    let pipeline = BatchPipeline::new(dispatcher, RatePolicy::default());

    let rows = read_rows("address\nJakarta\nBandung\n".as_bytes()).unwrap();
    let report = pipeline
        .run(BatchJob::new(rows, "address", ProviderId::Mapbox))
        .await;

    for row in &report.rows {
        assert_eq!(row.status(), Some("Mapbox access token not configured"));
        assert_eq!(row.latitude(), None);
    }
    assert_eq!(
        report.errors(),
        [
            "Row 1: Mapbox access token not configured",
            "Row 2: Mapbox access token not configured"
        ]
    );
    assert_eq!(pipeline.geocoder().mapbox_cache_stats().misses, 0);
}

#[tokio::test(start_paused = true)]
async fn test_input_cells_survive_processing() {
    let rows = read_rows("kode,lokasi,catatan\n007,Surabaya,\"a, b\"\n".as_bytes()).unwrap();
    let geocoder = TableGeocoder::new(vec![(
        "Surabaya",
        GeocodeOutcome::found(-7.25, 112.75, "Surabaya"),
    )]);
    let pipeline = BatchPipeline::new(geocoder, RatePolicy::default());

    let report = pipeline
        .run(BatchJob::new(rows, "lokasi", ProviderId::LocationIq))
        .await;

    let row = &report.rows[0];
    assert_eq!(row.get("kode"), Some(&CellValue::Text("007".to_string())));
    assert_eq!(row.get("catatan"), Some(&CellValue::Text("a, b".to_string())));
    assert_eq!(row.status(), Some("Success"));
}
