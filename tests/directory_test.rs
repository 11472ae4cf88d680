use community_feed::directory::parse_directory;
use community_feed::Source;

#[test]
fn parses_simple_directory() {
    let csv = "organisation,feed_url\n\
               Riverside Food Bank,https://riversidefood.example.org/feed\n\
               Harbour Arts Centre,https://harbourarts.example.org/rss.xml\n";
    let sources = parse_directory(csv).unwrap();
    assert_eq!(
        sources,
        vec![
            Source {
                organisation: "Riverside Food Bank".to_string(),
                feed_url: "https://riversidefood.example.org/feed".to_string(),
            },
            Source {
                organisation: "Harbour Arts Centre".to_string(),
                feed_url: "https://harbourarts.example.org/rss.xml".to_string(),
            },
        ]
    );
}

#[test]
fn comma_inside_quotes_is_one_field() {
    let csv = "organisation,feed_url\n\"Friends, of the Park\",\"http://x/feed\"\n";
    let sources = parse_directory(csv).unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].organisation, "Friends, of the Park");
    assert_eq!(sources[0].feed_url, "http://x/feed");
}

#[test]
fn newline_inside_quotes_is_one_field() {
    let csv = "organisation,feed_url\n\"Line1\nLine2\",http://x/feed\nNext Org,http://y/feed\n";
    let sources = parse_directory(csv).unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].organisation, "Line1\nLine2");
    assert_eq!(sources[1].organisation, "Next Org");
}

#[test]
fn doubled_quotes_become_literal_quotes() {
    let csv = "organisation,feed_url\n\"The \"\"Hub\"\"\",http://x/feed\n";
    let sources = parse_directory(csv).unwrap();
    assert_eq!(sources[0].organisation, "The \"Hub\"");
}

#[test]
fn rows_without_feed_url_are_skipped() {
    let csv = "organisation,feed_url\n\
               Has Feed,http://x/feed\n\
               No Feed,\n\
               Short Row\n\
               Also Has Feed,http://y/feed\n";
    let sources = parse_directory(csv).unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].organisation, "Has Feed");
    assert_eq!(sources[1].organisation, "Also Has Feed");
}

#[test]
fn fields_are_trimmed() {
    let csv = "organisation,feed_url\n  Spacey Org  ,  http://x/feed  \n";
    let sources = parse_directory(csv).unwrap();
    assert_eq!(sources[0].organisation, "Spacey Org");
    assert_eq!(sources[0].feed_url, "http://x/feed");
}

#[test]
fn extra_columns_are_ignored() {
    let csv = "organisation,contact,feed_url\nOrg A,someone@a.org,http://a/feed\n";
    let sources = parse_directory(csv).unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].feed_url, "http://a/feed");
}

#[test]
fn serialize_and_reparse_round_trips() {
    let csv = "organisation,feed_url\n\
               \"Friends, of the Park\",http://x/feed\n\
               \"Multi\nLine\",http://y/feed\n\
               \"The \"\"Hub\"\"\",http://z/feed\n";
    let parsed = parse_directory(csv).unwrap();

    let mut writer = csv::Writer::from_writer(Vec::new());
    for source in &parsed {
        writer.serialize(source).unwrap();
    }
    let rewritten = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    let reparsed = parse_directory(&rewritten).unwrap();
    assert_eq!(parsed, reparsed);
}
