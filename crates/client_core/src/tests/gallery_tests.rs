use super::*;

fn occ(url: &str) -> PhotoSlot {
    PhotoSlot::Occupied(url.to_string())
}

fn layout(entries: &[Option<&str>]) -> Vec<PhotoSlot> {
    entries
        .iter()
        .map(|entry| entry.map_or(PhotoSlot::Empty, occ))
        .collect()
}

fn padded(entries: &[Option<&str>]) -> PhotoSlots {
    let mut slots = layout(entries);
    slots.resize(GALLERY_SLOTS, PhotoSlot::Empty);
    normalize(&slots)
}

fn sample_inputs() -> Vec<Vec<PhotoSlot>> {
    vec![
        Vec::new(),
        layout(&[None, None, None]),
        layout(&[Some("a")]),
        layout(&[None, Some("a"), None, Some("b"), Some("c")]),
        layout(&[
            Some("a"),
            None,
            Some("b"),
            None,
            Some("c"),
            None,
            Some("d"),
            None,
            Some("e"),
        ]),
        layout(&[
            Some("a"),
            Some("b"),
            Some("c"),
            Some("d"),
            Some("e"),
            Some("f"),
            Some("g"),
            Some("h"),
            Some("i"),
        ]),
    ]
}

#[test]
fn normalize_is_idempotent_and_always_nine_long() {
    for input in sample_inputs() {
        let once = normalize(&input);
        assert_eq!(once.as_slice().len(), GALLERY_SLOTS);
        assert!(once.is_normalized());
        assert_eq!(normalize(once.as_slice()), once);
    }
}

#[test]
fn normalize_preserves_relative_order_of_occupied_slots() {
    for input in sample_inputs() {
        let expected: Vec<String> = input
            .iter()
            .filter_map(PhotoSlot::url)
            .map(str::to_string)
            .collect();
        assert_eq!(normalize(&input).occupied_urls(), expected);
    }
}

#[test]
fn normalize_compacts_gap_between_photos() {
    let input = layout(&[
        Some("A"),
        None,
        Some("B"),
        None,
        None,
        None,
        None,
        None,
        None,
    ]);
    assert_eq!(normalize(&input), padded(&[Some("A"), Some("B")]));
    assert_eq!(normalize(&input).as_slice()[2], PhotoSlot::Empty);
}

#[test]
fn normalize_ignores_entries_past_the_ninth() {
    let mut input: Vec<PhotoSlot> = (0..GALLERY_SLOTS).map(|i| occ(&format!("p{i}"))).collect();
    input.push(occ("overflow"));
    let slots = normalize(&input);
    assert_eq!(slots.occupied_count(), GALLERY_SLOTS);
    assert!(!slots.occupied_urls().contains(&"overflow".to_string()));
}

#[test]
fn delete_clears_photo_and_pulls_rest_forward() {
    let slots = padded(&[Some("A"), Some("B")]);
    let next = apply_delete(&slots, "A");
    assert_eq!(next, padded(&[Some("B")]));
    assert!(!next.as_slice().contains(&occ("A")));
}

#[test]
fn delete_clears_every_occurrence() {
    let slots = normalize(&layout(&[Some("A"), Some("B"), Some("A"), Some("C")]));
    let next = apply_delete(&slots, "A");
    assert_eq!(next.occupied_urls(), vec!["B", "C"]);
}

#[test]
fn delete_of_unknown_url_leaves_layout_unchanged() {
    let slots = padded(&[Some("A"), Some("B")]);
    assert_eq!(apply_delete(&slots, "Z"), slots);
}

#[test]
fn upload_into_last_slot_moves_photo_to_first_free_position() {
    let slots = padded(&[Some("A"), Some("B")]);
    let next = apply_upload(&slots, SlotIndex::new(8).expect("index"), "C");
    assert_eq!(next, padded(&[Some("A"), Some("B"), Some("C")]));
}

#[test]
fn upload_into_occupied_slot_replaces_photo() {
    let slots = padded(&[Some("A"), Some("B")]);
    let next = apply_upload(&slots, SlotIndex::new(0).expect("index"), "C");
    assert_eq!(next.occupied_urls(), vec!["C", "B"]);
}

#[test]
fn upload_keeps_existing_photos_and_adds_exactly_one() {
    let slots = padded(&[Some("A"), Some("B"), Some("C")]);
    for index in 3..GALLERY_SLOTS {
        let next = apply_upload(&slots, SlotIndex::new(index).expect("index"), "D");
        assert_eq!(next.occupied_urls(), vec!["A", "B", "C", "D"]);
    }
}

#[test]
fn slot_index_rejects_positions_past_the_grid() {
    assert!(SlotIndex::new(GALLERY_SLOTS - 1).is_ok());
    assert!(matches!(
        SlotIndex::new(GALLERY_SLOTS),
        Err(ClientError::SlotOutOfRange(9))
    ));
}

#[test]
fn reorder_drag_result_is_compacted_and_request_omits_empties() {
    let drag = layout(&[
        Some("C"),
        None,
        Some("A"),
        Some("B"),
        None,
        None,
        None,
        None,
        None,
    ]);
    let (slots, request) = apply_reorder(&drag);
    assert_eq!(slots, padded(&[Some("C"), Some("A"), Some("B")]));
    assert_eq!(request.profile_pictures, vec!["C", "A", "B"]);
}

#[test]
fn reorder_request_matches_occupied_urls_of_normalized_order() {
    for input in sample_inputs() {
        let (slots, request) = apply_reorder(&input);
        assert_eq!(request.profile_pictures, normalize(&input).occupied_urls());
        assert_eq!(request.profile_pictures, slots.occupied_urls());
    }
}

#[test]
fn from_remote_caps_at_nine_photos() {
    let urls: Vec<String> = (0..12).map(|i| format!("u{i}")).collect();
    let slots = PhotoSlots::from_remote(urls.clone());
    assert_eq!(slots.occupied_urls(), urls[..GALLERY_SLOTS].to_vec());
}

#[test]
fn permutation_from_indexes_moves_listed_slots_first() {
    let slots = padded(&[Some("A"), Some("B"), Some("C")]);
    let permutation = permutation_from_indexes(&slots, &[2, 0]).expect("permutation");
    assert_eq!(permutation.len(), GALLERY_SLOTS);
    assert_eq!(normalize(&permutation).occupied_urls(), vec!["C", "A", "B"]);
}

#[test]
fn permutation_from_indexes_rejects_duplicates_and_out_of_range() {
    let slots = padded(&[Some("A"), Some("B")]);
    assert!(matches!(
        permutation_from_indexes(&slots, &[1, 1]),
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        permutation_from_indexes(&slots, &[12]),
        Err(ClientError::SlotOutOfRange(12))
    ));
}
