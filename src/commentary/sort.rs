use super::{CommentaryEntry, Language};
use std::cmp::Ordering;

/// Panel order for two entries.
///
/// Rules apply in sequence: leading anchor, intra-source order when both
/// sides know it, source reference for the same commentator, then bilingual
/// before Hebrew-only, `Modern` last among categories and notes last among
/// kinds. The order-within-source rule only fires when both values are
/// nonzero, so this comparator is not guaranteed transitive.
pub fn compare_entries(a: &CommentaryEntry, b: &CommentaryEntry) -> Ordering {
    let by_anchor = a.anchor.leading().cmp(&b.anchor.leading());
    if by_anchor != Ordering::Equal {
        return by_anchor;
    }

    if a.order_within_source != 0 && b.order_within_source != 0 {
        let by_order = a.order_within_source.cmp(&b.order_within_source);
        if by_order != Ordering::Equal {
            return by_order;
        }
    }

    if a.commentator == b.commentator {
        if let (Some(left), Some(right)) = (&a.source_ref, &b.source_ref) {
            let by_source = left.compare(right);
            if by_source != Ordering::Equal {
                return by_source;
            }
        }
    }

    let he_only = |entry: &CommentaryEntry| entry.language == Language::HeOnly;
    let modern = |entry: &CommentaryEntry| entry.category == "Modern";
    he_only(a)
        .cmp(&he_only(b))
        .then_with(|| modern(a).cmp(&modern(b)))
        .then_with(|| a.is_note().cmp(&b.is_note()))
}

/// Stable sort by [`compare_entries`]; remaining ties keep input order.
///
/// A merge sort is used directly because the comparator may be
/// intransitive, which the standard library sorts are allowed to reject.
pub fn sort_entries(entries: &mut [CommentaryEntry]) {
    if entries.len() < 2 {
        return;
    }
    let mut order: Vec<usize> = (0..entries.len()).collect();
    let mut scratch = Vec::with_capacity(entries.len());
    merge_sort(&mut order, &mut scratch, &|i, j| {
        compare_entries(&entries[i], &entries[j])
    });
    let sorted: Vec<CommentaryEntry> = order.iter().map(|&i| entries[i].clone()).collect();
    entries.clone_from_slice(&sorted);
}

fn merge_sort<F>(items: &mut [usize], scratch: &mut Vec<usize>, cmp: &F)
where
    F: Fn(usize, usize) -> Ordering,
{
    if items.len() <= 1 {
        return;
    }
    let mid = items.len() / 2;
    merge_sort(&mut items[..mid], scratch, cmp);
    merge_sort(&mut items[mid..], scratch, cmp);

    scratch.clear();
    let (mut left, mut right) = (0, mid);
    while left < mid && right < items.len() {
        // Take from the right half only when strictly smaller.
        if cmp(items[right], items[left]) == Ordering::Less {
            scratch.push(items[right]);
            right += 1;
        } else {
            scratch.push(items[left]);
            left += 1;
        }
    }
    scratch.extend_from_slice(&items[left..mid]);
    scratch.extend_from_slice(&items[right..]);
    items.copy_from_slice(scratch);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::{Anchor, EntryKind};
    use crate::reference::Reference;

    fn entry(commentator: &str, anchor: u32) -> CommentaryEntry {
        CommentaryEntry {
            id: None,
            source_index: 0,
            anchor: Anchor::single(anchor),
            source_ref: None,
            source_ref_text: String::new(),
            commentator: commentator.to_string(),
            he_commentator: commentator.to_string(),
            category: "Commentary".to_string(),
            kind: EntryKind::Commentary,
            link_type: "commentary".to_string(),
            english: "text".to_string(),
            hebrew: "טקסט".to_string(),
            anchor_text: String::new(),
            order_within_source: 0,
            owner: None,
            visibility: None,
            title: None,
            color_index: 0,
            language: Language::Bilingual,
        }
    }

    fn names(entries: &[CommentaryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.commentator.as_str()).collect()
    }

    #[test]
    fn distinct_anchors_sort_ascending_from_any_order() {
        let mut entries: Vec<CommentaryEntry> = [5, 1, 4, 2, 3]
            .iter()
            .map(|&a| entry(&format!("C{a}"), a))
            .collect();
        sort_entries(&mut entries);
        let anchors: Vec<u32> = entries.iter().map(|e| e.anchor.leading()).collect();
        assert_eq!(anchors, vec![1, 2, 3, 4, 5]);

        entries.reverse();
        sort_entries(&mut entries);
        sort_entries(&mut entries);
        let anchors: Vec<u32> = entries.iter().map(|e| e.anchor.leading()).collect();
        assert_eq!(anchors, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn compound_anchor_sorts_by_leading_segment() {
        let mut multi = entry("Multi", 0);
        multi.anchor = Anchor::from_loose(Some(&crate::commentary::Loose::Text("3 1".into())));
        let mut entries = vec![multi, entry("Two", 2)];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), vec!["Two", "Multi"]);
    }

    #[test]
    fn known_order_within_source_wins() {
        let mut second = entry("Ibn Ezra", 1);
        second.order_within_source = 2;
        let mut first = entry("Rashi", 1);
        first.order_within_source = 1;
        let mut entries = vec![second, first];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), vec!["Rashi", "Ibn Ezra"]);
    }

    #[test]
    fn same_commentator_follows_source_order_with_prefix_first() {
        let with_ref = |citation: &str| {
            let mut e = entry("Genesis Rabbah", 1);
            e.source_ref = Reference::parse_loose(citation).ok();
            e.source_ref_text = citation.to_string();
            e
        };
        let mut entries = vec![
            with_ref("Genesis Rabbah 1:5"),
            with_ref("Genesis Rabbah 1:2:3"),
            with_ref("Genesis Rabbah 1:2"),
        ];
        sort_entries(&mut entries);
        let refs: Vec<&str> = entries.iter().map(|e| e.source_ref_text.as_str()).collect();
        assert_eq!(
            refs,
            vec!["Genesis Rabbah 1:2", "Genesis Rabbah 1:2:3", "Genesis Rabbah 1:5"]
        );
    }

    #[test]
    fn hebrew_only_modern_and_notes_sort_later() {
        let mut he_only = entry("HeOnly", 1);
        he_only.language = Language::HeOnly;
        let mut modern = entry("Modern", 1);
        modern.category = "Modern".to_string();
        let mut note = entry("Note", 1);
        note.kind = EntryKind::Note;
        note.category = "Notes".to_string();
        let mut entries = vec![note, he_only, modern, entry("Plain", 1)];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), vec!["Plain", "Note", "Modern", "HeOnly"]);
    }

    #[test]
    fn remaining_ties_keep_input_order() {
        let mut entries = vec![entry("B", 1), entry("A", 1), entry("C", 1)];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), vec!["B", "A", "C"]);
    }

    #[test]
    fn intransitive_input_still_sorts() {
        // c < a by order, a < b by category, b < c by language
        let mut a = entry("A", 1);
        a.order_within_source = 2;
        let mut b = entry("B", 1);
        b.category = "Modern".to_string();
        let mut c = entry("C", 1);
        c.order_within_source = 1;
        c.language = Language::HeOnly;
        assert_eq!(compare_entries(&c, &a), Ordering::Less);
        assert_eq!(compare_entries(&a, &b), Ordering::Less);
        assert_eq!(compare_entries(&b, &c), Ordering::Less);
        let mut entries: Vec<CommentaryEntry> = Vec::new();
        for _ in 0..10 {
            entries.extend([a.clone(), b.clone(), c.clone()]);
        }
        sort_entries(&mut entries);
        assert_eq!(entries.len(), 30);
    }
}
