#[cfg(test)]
mod tests {
    use lopdf::Document;
    use lopdf::content::Content;
    use regex::Regex;
    use time::OffsetDateTime;

    use crate::assets::IconSource;
    use crate::config::Config;
    use crate::error::ReportError;
    use crate::plan::LayoutPlan;
    use crate::record::FieldRecord;
    use crate::render::{RenderedDocument, Reporter};
    use crate::test_support::{MockFetcher, jpeg_bytes, png_bytes, webp_bytes};

    const PHOTO: &str = "http://listings.example/photos/1042.jpg";

    async fn render(fetcher: MockFetcher, record: &FieldRecord) -> Result<RenderedDocument, ReportError> {
        Reporter::new(fetcher, Config::default())
            .render(record, LayoutPlan::worksheet(), OffsetDateTime::UNIX_EPOCH)
            .await
    }

    /// Every string shown with `Tj`, page by page.
    fn shown_text(bytes: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(bytes).expect("Failed to parse PDF");
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj")
                    .map(|op| String::from_utf8_lossy(op.operands[0].as_str().unwrap()).into_owned())
                    .collect()
            })
            .collect()
    }

    fn image_placements(bytes: &[u8]) -> usize {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                content.operations.iter().filter(|op| op.operator == "Do").count()
            })
            .sum()
    }

    #[tokio::test]
    async fn minimal_record_renders_two_pages() {
        let record = FieldRecord::new("A123");
        let document = render(MockFetcher::default(), &record).await.unwrap();
        let bytes = document.to_bytes();

        assert!(!bytes.is_empty());
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(document.pages, 2);

        let pages = shown_text(&bytes);
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains(&"$???,???".to_string()));
        assert!(pages[0].contains(&"# A123".to_string()));
        assert!(pages[0].contains(&"Star Rating: ".to_string()));
        assert!(pages[1].contains(&"Work Needed: ".to_string()));
        assert!(pages.iter().flatten().all(|t| !t.contains("undefined")));
        // listing symbol, map symbol and icon
        assert_eq!(image_placements(&bytes), 3);
    }

    #[tokio::test]
    async fn photo_adds_exactly_one_placement() {
        let record = FieldRecord {
            img_url: Some(PHOTO.to_string()),
            ..FieldRecord::new("A123")
        };
        let fetcher = MockFetcher::default().with_body(PHOTO, jpeg_bytes(40, 30));
        let with_photo = render(fetcher, &record).await.unwrap().to_bytes();
        let without_photo = render(MockFetcher::default(), &FieldRecord::new("A123"))
            .await
            .unwrap()
            .to_bytes();

        assert_eq!(image_placements(&with_photo), 4);
        assert_eq!(shown_text(&with_photo), shown_text(&without_photo));
    }

    #[tokio::test]
    async fn webp_photo_is_embedded_after_conversion() {
        let url = "http://listings.example/photos/1042.webp";
        let record = FieldRecord {
            img_url: Some(url.to_string()),
            ..FieldRecord::new("W1")
        };
        let fetcher = MockFetcher::default().with_body(url, webp_bytes(16, 16));
        let document = render(fetcher, &record).await.unwrap();
        assert_eq!(image_placements(&document.to_bytes()), 4);
    }

    #[tokio::test]
    async fn png_served_under_jpg_path_is_embedded() {
        let url = "http://cdn.example/photos/1.jpg";
        let record = FieldRecord {
            img_url: Some(url.to_string()),
            ..FieldRecord::new("P1")
        };
        let fetcher = MockFetcher::default().with_body(url, png_bytes(10, 10));
        let document = render(fetcher, &record).await.unwrap();
        assert_eq!(document.pages, 2);
        assert_eq!(image_placements(&document.to_bytes()), 4);
    }

    #[tokio::test]
    async fn unsupported_photo_produces_no_bytes() {
        let record = FieldRecord {
            img_url: Some("http://listings.example/photos/1042.bmp".to_string()),
            ..FieldRecord::new("A123")
        };
        let fetcher = MockFetcher::default();
        let err = render(fetcher.clone(), &record).await.unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedFormat(ref ext) if ext == "bmp"));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn photo_not_found_fails_the_render() {
        let record = FieldRecord {
            img_url: Some(PHOTO.to_string()),
            ..FieldRecord::new("A123")
        };
        let fetcher = MockFetcher::default().with_status(PHOTO, 404);
        let err = render(fetcher, &record).await.unwrap_err();
        assert!(matches!(err, ReportError::Fetch { status: 404, .. }));
    }

    #[tokio::test]
    async fn remote_icon_is_a_required_asset() {
        let icon = "http://static.example/car.png";
        let config = Config {
            icon: IconSource::Remote(icon.to_string()),
            ..Config::default()
        };
        let failing = Reporter::new(MockFetcher::default().with_status(icon, 503), config.clone());
        let err = failing
            .render(&FieldRecord::new("I1"), LayoutPlan::worksheet(), OffsetDateTime::UNIX_EPOCH)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Fetch { status: 503, .. }));

        let working = Reporter::new(MockFetcher::default().with_body(icon, png_bytes(8, 8)), config);
        let document = working
            .render(&FieldRecord::new("I1"), LayoutPlan::worksheet(), OffsetDateTime::UNIX_EPOCH)
            .await
            .unwrap();
        assert_eq!(document.pages, 2);
    }

    #[tokio::test]
    async fn same_record_renders_byte_identical() {
        let record = FieldRecord {
            city: Some("Springfield".to_string()),
            address: Some("742 Evergreen Terrace".to_string()),
            num_beds: Some("4".to_string()),
            num_baths: Some("2.5".to_string()),
            price: Some("$350,000".to_string()),
            url: Some("https://listings.example/1042".to_string()),
            img_url: Some(PHOTO.to_string()),
            ..FieldRecord::new("1042")
        };
        let fetcher = MockFetcher::default().with_body(PHOTO, jpeg_bytes(20, 20));
        let first = render(fetcher.clone(), &record).await.unwrap();
        let second = render(fetcher, &record).await.unwrap();
        assert_eq!(first.to_bytes(), second.to_bytes());

        let text = shown_text(&first.to_bytes()).concat();
        for expected in ["Springfield", "742 Evergreen Terrace", "4", "2.5", "$350,000", "# 1042"] {
            assert!(text.contains(&expected.to_string()), "missing {:?}", expected);
        }
    }

    #[tokio::test]
    async fn metadata_names_the_report() {
        let document = render(MockFetcher::default(), &FieldRecord::new("A123")).await.unwrap();
        let bytes = document.to_bytes();
        let raw = String::from_utf8_lossy(&bytes);
        let title = Regex::new(r"/Title\s*\(House Review #A123\)").unwrap();
        let created = Regex::new(r"/CreationDate\s*\(D:19700101000000Z\)").unwrap();
        assert!(title.is_match(&raw));
        assert!(created.is_match(&raw));
    }

    #[tokio::test]
    async fn small_chunks_cover_the_whole_file() {
        let config = Config {
            chunk_size: 1000,
            ..Config::default()
        };
        let document = Reporter::new(MockFetcher::default(), config)
            .render(&FieldRecord::new("C1"), LayoutPlan::worksheet(), OffsetDateTime::UNIX_EPOCH)
            .await
            .unwrap();
        assert!(document.chunks.len() > 1);
        assert!(document.chunks.iter().all(|c| c.len() <= 1000));
        assert!(Document::load_mem(&document.to_bytes()).is_ok());
    }
}
