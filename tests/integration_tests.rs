//! Integration tests against a real headless Chrome

#![cfg(feature = "cdp")]

use html_to_pdf::{Converter, ConverterConfig, Insets, PageConfiguration, PageSize};

const HELLO: &str = "<html><body><h1>Hello, World!</h1></body></html>";

fn config_in(dir: &std::path::Path) -> ConverterConfig {
    ConverterConfig {
        temp_dir: Some(dir.to_path_buf()),
        // Containers usually lack the namespaces the sandbox needs
        sandbox: false,
        ..Default::default()
    }
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn test_convert_hello_world() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let converter = Converter::new(config_in(tmp.path())).await.expect("Failed to start Chrome");

    let destination = out.path().join("out.pdf");
    converter
        .convert(HELLO, &destination, &PageConfiguration::default())
        .await
        .expect("Conversion failed");

    let pdf = std::fs::read(&destination).unwrap();
    assert!(pdf.len() > 100, "PDF seems too small");
    assert!(pdf.starts_with(b"%PDF-"));
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);

    converter.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn test_convert_to_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let converter = Converter::new(config_in(tmp.path())).await.expect("Failed to start Chrome");

    converter
        .convert_to_directory(HELLO, "helloWorld", out.path(), &PageConfiguration::default())
        .await
        .expect("Conversion failed");

    let pdf = std::fs::read(out.path().join("helloWorld.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));

    converter.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
#[ignore] // Requires Chrome to be installed
async fn test_engine_pool_converts_in_parallel() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let config = ConverterConfig {
        pool_size: 2,
        ..config_in(tmp.path())
    };
    let converter = Converter::new(config).await.expect("Failed to start Chrome");
    let page = PageConfiguration::new(PageSize::LETTER, Insets::uniform(36.0));

    let jobs = (0..4).map(|i| {
        let converter = converter.clone();
        let destination = out.path().join(format!("page-{}.pdf", i));
        async move {
            let html = format!("<h1>Page {}</h1>", i);
            converter.convert(&html, &destination, &page).await.map(|_| destination)
        }
    });

    for res in futures::future::join_all(jobs).await {
        let destination = res.expect("Conversion failed");
        assert!(std::fs::read(destination).unwrap().starts_with(b"%PDF-"));
    }
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);

    converter.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn test_free_function_convert() {
    let out = tempfile::tempdir().unwrap();
    let destination = out.path().join("free.pdf");

    // Default config keeps the sandbox on; skip where Chrome cannot start with it
    if let Err(e) = html_to_pdf::convert(HELLO, &destination, &PageConfiguration::default()).await {
        eprintln!("Skipping: {}", e);
        return;
    }
    assert!(std::fs::read(destination).unwrap().starts_with(b"%PDF-"));
}
