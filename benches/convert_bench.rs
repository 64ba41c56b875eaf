use criterion::{criterion_group, criterion_main, Criterion};
use html_to_pdf::{Converter, ConverterConfig, Engine, PageConfiguration, Result};
use url::Url;

// Measures the pipeline around the engine: temp document, worker hop, write, cleanup.
struct NullEngine;

impl Engine for NullEngine {
    fn new(_config: &ConverterConfig) -> Result<Self> {
        Ok(Self)
    }

    fn load_file(&mut self, _url: &Url) -> Result<()> {
        Ok(())
    }

    fn print_pdf(&mut self, _page: &PageConfiguration) -> Result<Vec<u8>> {
        Ok(b"%PDF-1.4\n%%EOF\n".to_vec())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

fn bench_convert(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = ConverterConfig {
        temp_dir: Some(tmp.path().to_path_buf()),
        ..Default::default()
    };
    let converter = rt
        .block_on(Converter::with_engine::<NullEngine>(config))
        .expect("converter");
    let destination = tmp.path().join("bench.pdf");
    let page = PageConfiguration::default();
    let html = "<html><body>".to_string() + &"<p>lorem ipsum</p>".repeat(500) + "</body></html>";

    c.bench_function("convert_null_engine", |b| {
        b.iter(|| {
            rt.block_on(converter.convert(&html, &destination, &page))
                .unwrap();
        })
    });

    let _ = rt.block_on(converter.close());
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
