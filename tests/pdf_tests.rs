//! Tests over the generated PDF byte stream, parsed back with lopdf.

use billpress::generate;
use lopdf::Document as LopdfDocument;
use serde_json::json;

fn bill_template(bill_content_height: f32) -> String {
    json!({
        "page": { "size": "a4", "orientation": "portrait" },
        "sectionHeights": {
            "pageHeader": 50.0,
            "billHeader": 40.0,
            "billContent": bill_content_height,
            "pageFooter": 40.0
        },
        "pageHeader": [
            { "label": "Bill of charges", "x": 0.0, "y": 20.0 }
        ],
        "billHeader": [
            { "label": "Account", "x": 0.0, "y": 0.0, "bind": "accountName" }
        ],
        "billContentTables": [{
            "x": 0.0, "y": 0.0, "width": 300.0,
            "fontSize": 10.0, "cellPadding": 5.0,
            "columns": [
                { "label": "Item", "bind": "item", "width": 200.0 },
                { "label": "Price", "bind": "price", "width": 100.0 }
            ]
        }]
    })
    .to_string()
}

fn bill_data(n: usize) -> String {
    let items: Vec<_> = (0..n)
        .map(|i| json!({ "item": format!("Charge {i}"), "price": format!("{i}.50") }))
        .collect();
    json!({
        "items": items,
        "contentDetails": { "accountName": "Morgan Vale" }
    })
    .to_string()
}

fn extract_page_text(pdf_bytes: &[u8], page_num: u32) -> String {
    let doc = LopdfDocument::load_mem(pdf_bytes).expect("generated PDF should parse");
    doc.extract_text(&[page_num]).expect("page text extraction")
}

#[test]
fn page_count_in_the_pdf_matches_the_layout() {
    let output = generate(&bill_template(100.0), &bill_data(10)).unwrap();
    assert!(output.page_count > 1);

    let doc = LopdfDocument::load_mem(&output.pdf).expect("generated PDF should parse");
    assert_eq!(doc.get_pages().len(), output.page_count);
}

#[test]
fn bound_values_appear_in_the_page_text() {
    let output = generate(&bill_template(600.0), &bill_data(3)).unwrap();
    assert_eq!(output.page_count, 1);

    let text = extract_page_text(&output.pdf, 1);
    assert!(text.contains("Bill of charges"));
    assert!(text.contains("Morgan Vale"));
    assert!(text.contains("Charge 0"));
    assert!(text.contains("Charge 2"));
    assert!(text.contains("2.50"));
}

#[test]
fn continuation_pages_carry_the_reprinted_table_header() {
    // Band of 100pt fits header + 3 rows per page; 10 rows spread over 4.
    let output = generate(&bill_template(100.0), &bill_data(10)).unwrap();
    assert_eq!(output.page_count, 4);

    for page_num in 1..=4u32 {
        let text = extract_page_text(&output.pdf, page_num);
        assert!(text.contains("Item"), "page {page_num} misses the header");
        assert!(text.contains("Price"), "page {page_num} misses the header");
        // The repeating page header replays too.
        assert!(text.contains("Bill of charges"), "page {page_num}");
    }
    // The one-time account line is confined to the first page.
    assert!(extract_page_text(&output.pdf, 1).contains("Morgan Vale"));
    assert!(!extract_page_text(&output.pdf, 2).contains("Morgan Vale"));

    // Rows stay in order across the page break.
    assert!(extract_page_text(&output.pdf, 2).contains("Charge 3"));
    assert!(extract_page_text(&output.pdf, 4).contains("Charge 9"));
}

#[test]
fn empty_item_list_still_produces_a_valid_single_page_pdf() {
    let output = generate(&bill_template(600.0), &bill_data(0)).unwrap();
    assert_eq!(output.page_count, 1);
    assert!(output.warnings.is_empty());

    let text = extract_page_text(&output.pdf, 1);
    assert!(text.contains("Item"));
    assert!(text.contains("Price"));
}

#[test]
fn generated_bytes_are_deterministic() {
    let tpl = bill_template(300.0);
    let data = bill_data(12);
    let a = generate(&tpl, &data).unwrap();
    let b = generate(&tpl, &data).unwrap();
    assert_eq!(a.pdf, b.pdf);
}
