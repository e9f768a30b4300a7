use fetchnet::base::neterror::NetError;
use fetchnet::http::orderedheaders::OrderedHeaderMap;

#[test]
fn test_ordered_headers_insertion_order() {
    let mut map = OrderedHeaderMap::new();

    map.insert("Authorization", "Bearer t");
    map.insert("Accept", "application/json");
    map.insert("X-Trace", "1");

    let names: Vec<_> = map.iter().map(|(k, _)| k).collect();
    assert_eq!(names, ["Authorization", "Accept", "X-Trace"]);

    let header_map = map.to_header_map().unwrap();
    let mut iter = header_map.iter();
    assert_eq!(iter.next().unwrap().0, "authorization");
    assert_eq!(iter.next().unwrap().0, "accept");
    assert_eq!(iter.next().unwrap().0, "x-trace");
}

#[test]
fn test_ordered_headers_update_preserves_order() {
    let mut map = OrderedHeaderMap::new();

    map.insert("A", "1");
    map.insert("B", "2");
    map.insert("C", "3");
    map.insert("B", "22");

    let pairs: Vec<_> = map.iter().collect();
    assert_eq!(pairs, [("A", "1"), ("B", "22"), ("C", "3")]);
}

#[test]
fn test_keys_are_case_sensitive() {
    let mut map = OrderedHeaderMap::new();

    map.insert("Content-Type", "text/plain");
    map.insert("content-type", "application/json");

    assert_eq!(map.len(), 2);
    assert_eq!(map.get("Content-Type"), Some("text/plain"));
    assert_eq!(map.get("CONTENT-TYPE"), None);
    assert_eq!(map.get_ignore_case("CONTENT-TYPE"), Some("text/plain"));
}

#[test]
fn test_invalid_header_rejected_on_conversion() {
    let mut map = OrderedHeaderMap::new();
    map.insert("Bad Name", "x");

    assert_eq!(map.to_header_map().unwrap_err(), NetError::InvalidHeader);
}

#[test]
fn test_ordered_headers_stress() {
    let mut map = OrderedHeaderMap::default();
    let count = 1000;

    for i in 0..count {
        map.insert(format!("X-{}", i), "value");
    }

    let standard = map.to_header_map().unwrap();
    assert_eq!(standard.len(), count);
    for i in 0..count {
        assert!(standard.contains_key(format!("x-{}", i).as_str()));
    }
}
