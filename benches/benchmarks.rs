use criterion::{criterion_group, criterion_main, Criterion};
use html_css_fetch::{asset_file_name, FileManager, HtmlParser, PageDocument};
use std::hint::black_box;
use tempfile::tempdir;
use url::Url;

const PAGE: &str = r#"
    <html>
        <head>
            <link rel="stylesheet" href="/style.css">
            <link rel="alternate stylesheet" href="theme.css">
            <link rel="icon" href="/favicon.ico">
            <link rel="stylesheet" href="//cdn.example.com/fonts.css?family=Inter">
            <script src="/script.js"></script>
        </head>
        <body>
            <img src="/logo.png" alt="Logo">
            <img src="../banner.jpg" alt="Banner">
            <a href="/about">About</a>
        </body>
    </html>
"#;

fn bench_find_stylesheets(c: &mut Criterion) {
    let parser = HtmlParser::new("https://example.com/dir/page.html").unwrap();

    c.bench_function("find_stylesheet_links", |b| {
        b.iter(|| {
            let document = PageDocument::parse(black_box(PAGE));
            let _links = parser.stylesheet_links(&document);
        });
    });
}

fn bench_rewrite_and_serialize(c: &mut Criterion) {
    let parser = HtmlParser::new("https://example.com/dir/page.html").unwrap();

    c.bench_function("absolutize_and_serialize", |b| {
        b.iter(|| {
            let document = PageDocument::parse(black_box(PAGE));
            parser.absolutize_sources(&document);
            let _html = document.serialize().unwrap();
        });
    });
}

fn bench_name_derivation(c: &mut Criterion) {
    let urls: Vec<Url> = vec![
        "https://example.com/style.css",
        "https://example.com/",
        "https://cdn.example.com/fonts.css?family=Inter",
        "https://example.com/themes/dark/MAIN.CSS",
        "https://example.com/a%20b/theme",
    ]
    .into_iter()
    .map(|u| Url::parse(u).unwrap())
    .collect();

    c.bench_function("derive_asset_names", |b| {
        b.iter(|| {
            for url in &urls {
                let _name = asset_file_name(black_box(url));
            }
        });
    });
}

fn bench_url_resolution(c: &mut Criterion) {
    let parser = HtmlParser::new("https://example.com/subdir/page.html").unwrap();
    let test_urls = vec![
        "../style.css",
        "./theme.css",
        "css/site.css",
        "https://cdn.example.com/style.css",
        "//cdn.example.com/lib.css",
    ];

    c.bench_function("resolve_urls", |b| {
        b.iter(|| {
            for url in &test_urls {
                let _resolved = parser.resolve_url(black_box(url)).unwrap();
            }
        });
    });
}

fn bench_asset_saving(c: &mut Criterion) {
    let temp_dir = tempdir().unwrap();
    let file_manager = FileManager::new(temp_dir.path()).unwrap();
    let content = b"body { color: red; margin: 0 auto; }";

    c.bench_function("save_asset", |b| {
        b.iter(|| {
            let _result = file_manager.save_asset("a1b2c3d4-style.css", black_box(content));
        });
    });
}

criterion_group!(
    benches,
    bench_find_stylesheets,
    bench_rewrite_and_serialize,
    bench_name_derivation,
    bench_url_resolution,
    bench_asset_saving,
);
criterion_main!(benches);
