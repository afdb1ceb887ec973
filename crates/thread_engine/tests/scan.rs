use std::collections::HashSet;
use std::sync::Once;

use pretty_assertions::assert_eq;
use scraper::Html;
use thread_engine::{
    isolate_document, ExtractError, NormalizerConfig, ScanOutput, ThreadLayout, ThreadScanner,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(harvest_logging::initialize_for_tests);
}

fn thread(body: &str) -> String {
    format!(
        r#"<html><head><title>t</title></head><body><h1>thread</h1><div id="threadcontent">{body}</div></body></html>"#
    )
}

fn post_a(number: &str, text: &str) -> String {
    format!(
        r#"<div class="post" id="{number}"><div class="post-header"><span class="postid">{number}</span><span class="postusername">name</span><span class="uid">ID:u{number}</span></div><div class="post-content">{text}</div></div>"#
    )
}

fn numbers(scanner: &ThreadScanner, html: &str) -> Vec<Option<u32>> {
    scanner
        .extract_document(html)
        .posts
        .iter()
        .map(|p| p.number)
        .collect()
}

#[test]
fn one_post_and_one_unpaired_header() {
    init_logging();
    let html = thread(&format!(
        r#"{}<div class="t_h">4 : <span>bob</span></div>"#,
        post_a("3", "three")
    ));
    let scanner = ThreadScanner::default();
    let extraction = scanner.extract_document(&html);

    assert_eq!(extraction.posts.len(), 1);
    assert_eq!(extraction.posts[0].number, Some(3));
    assert_eq!(extraction.stats.structure_a, 1);
    assert_eq!(extraction.stats.pairing_failed, 1);
}

#[test]
fn unpaired_header_is_marked_consumed() {
    init_logging();
    let doc = Html::parse_document(&thread(r#"<div class="t_h">4 :</div><div class="banner"></div>"#));
    let scanner = ThreadScanner::default();
    let container = scanner.locate_container(&doc).unwrap();
    let candidates = scanner.enumerate_candidates(container);
    let mut consumed = HashSet::new();

    let output = scanner.dispatch(&candidates, &mut consumed);

    assert!(output.records.is_empty());
    assert!(consumed.contains(&(*candidates[0]).id()));
    assert!(!consumed.contains(&(*candidates[1]).id()));
}

#[test]
fn mixed_layouts_in_document_order() {
    init_logging();
    let html = thread(&format!(
        "{}\n<div class=\"t_h\">2 : <span>b</span> <span>2024/01/01(月) 00:00:01</span> <span>ID:bb</span></div>\n<br>\n<div class=\"t_b\">&gt;&gt;1 reply</div>\n{}",
        post_a("1", "first"),
        post_a("3", "&gt;&gt;2 &gt;&gt;1"),
    ));
    let extraction = ThreadScanner::default().extract_document(&html);

    let posts = &extraction.posts;
    assert_eq!(
        posts.iter().map(|p| p.number).collect::<Vec<_>>(),
        vec![Some(1), Some(2), Some(3)]
    );
    assert_eq!(posts[1].author_tag, "ID:bb");
    assert_eq!(posts[1].timestamp, "2024/01/01(月) 00:00:01");
    assert_eq!(posts[1].references, vec![1]);
    assert_eq!(posts[2].references, vec![2, 1]);
    assert_eq!(extraction.stats.structure_b, 1);
}

#[test]
fn consumed_content_is_not_revisited() {
    init_logging();
    let html = thread(r#"<div class="t_h">5 :</div><div class="t_b">body</div>"#);
    let scanner = ThreadScanner::default();
    let output = scanner.scan(&html).unwrap();

    assert_eq!(output.stats.candidates, 2);
    assert_eq!(output.records.len(), 1);
    assert_eq!(output.stats.skipped(), 0);
}

#[test]
fn duplicate_numbers_keep_first() {
    init_logging();
    let html = thread(&format!("{}{}", post_a("9", "first"), post_a("9", "second")));
    let extraction = ThreadScanner::default().extract_document(&html);

    assert_eq!(extraction.posts.len(), 1);
    assert_eq!(extraction.posts[0].body_text, "first");
    assert_eq!(extraction.stats.duplicates_dropped, 1);
}

#[test]
fn output_is_sorted_by_number() {
    init_logging();
    let html = thread(&format!(
        "{}{}{}",
        post_a("30", "c"),
        post_a("2", "a"),
        post_a("11", "b")
    ));
    assert_eq!(
        numbers(&ThreadScanner::default(), &html),
        vec![Some(2), Some(11), Some(30)]
    );
}

#[test]
fn broken_nodes_are_skipped_not_fatal() {
    init_logging();
    let html = thread(&format!(
        r#"<div class="post"><div class="post-header"><span class="postid">x</span></div><div class="post-content">bad</div></div>
        <div class="post"><div class="post-content">no header</div></div>
        <div class="t_h">no number</div><div class="t_b">orphan</div>
        {}"#,
        post_a("6", "ok")
    ));
    let extraction = ThreadScanner::default().extract_document(&html);

    assert_eq!(extraction.posts.len(), 1);
    assert_eq!(extraction.stats.number_parse_failed, 1);
    assert_eq!(extraction.stats.missing_region, 2);
}

#[test]
fn missing_container_yields_empty_result() {
    init_logging();
    let scanner = ThreadScanner::default();
    let html = "<html><body><div id=\"other\"></div></body></html>";

    assert_eq!(
        scanner.scan(html),
        Err(ExtractError::ContainerNotFound {
            container_id: "threadcontent".to_string()
        })
    );
    let extraction = scanner.extract_document(html);
    assert!(extraction.posts.is_empty());
    assert!(extraction.stats.container_missing);
}

#[test]
fn falls_back_to_descendants_when_no_direct_candidates() {
    init_logging();
    let html = thread(&format!(
        r#"<section><article>{}</article><article>{}</article></section>"#,
        post_a("1", "x"),
        post_a("2", "y")
    ));
    assert_eq!(
        numbers(&ThreadScanner::default(), &html),
        vec![Some(1), Some(2)]
    );
}

#[test]
fn candidate_count_is_bounded() {
    init_logging();
    let body: String = (1..=10).map(|n| post_a(&n.to_string(), "x")).collect();
    let layout = ThreadLayout {
        max_candidates: 4,
        ..ThreadLayout::default()
    };
    let scanner = ThreadScanner::new(layout, NormalizerConfig::default());
    assert_eq!(
        numbers(&scanner, &thread(&body)),
        vec![Some(1), Some(2), Some(3), Some(4)]
    );
}

#[test]
fn custom_markers_are_honored() {
    init_logging();
    let layout = ThreadLayout {
        container_id: "posts".to_string(),
        header_class: "head".to_string(),
        content_class: "body".to_string(),
        ..ThreadLayout::default()
    };
    let scanner = ThreadScanner::new(layout, NormalizerConfig::default());
    let html = r#"<div id="posts"><div class="head">8 : <span>x</span></div><div class="body">hi</div></div>"#;
    let extraction = scanner.extract_document(html);
    assert_eq!(extraction.posts.len(), 1);
    assert_eq!(extraction.posts[0].author_handle, "x");
    assert_eq!(extraction.posts[0].body_text, "hi");
}

#[test]
fn fault_during_scan_drops_only_that_document() {
    init_logging();
    let faulted = isolate_document(|| -> Result<ScanOutput, ExtractError> {
        panic!("tree invariant broken")
    });
    assert!(faulted.posts.is_empty());
    assert!(faulted.stats.aborted);

    let html = thread(&post_a("4", "still fine"));
    let extraction = ThreadScanner::default().extract_document(&html);
    assert!(!extraction.stats.aborted);
    assert_eq!(
        extraction.posts.iter().map(|p| p.number).collect::<Vec<_>>(),
        vec![Some(4)]
    );
}

#[test]
fn container_error_is_counted_not_aborted() {
    init_logging();
    let extraction = isolate_document(|| {
        Err(ExtractError::ContainerNotFound {
            container_id: "threadcontent".to_string(),
        })
    });
    assert!(extraction.posts.is_empty());
    assert!(extraction.stats.container_missing);
    assert!(!extraction.stats.aborted);
}

#[test]
fn extraction_serializes_records_with_counters() {
    init_logging();
    let html = thread(&format!(
        r#"{}<div class="t_h">4 :</div>"#,
        post_a("3", "three")
    ));
    let extraction = ThreadScanner::default().extract_document(&html);
    let json = serde_json::to_value(&extraction).unwrap();

    assert_eq!(json["posts"][0]["number"], 3);
    assert_eq!(json["posts"][0]["author_tag"], "ID:u3");
    assert_eq!(json["stats"]["pairing_failed"], 1);
    assert_eq!(json["stats"]["structure_a"], 1);
    assert_eq!(json["stats"]["aborted"], false);
}
