//! Properties of reranking and thinking separation

mod common;

use common::OverlapScorer;
use quickcheck_macros::quickcheck;

use complaint_classifier::rag::{process_message, rerank, split_chunks};

#[quickcheck]
fn prop_rerank_output_is_subset_of_input(chunks: Vec<String>, query: String, top_k: u8) -> bool {
    // Chunks containing the separator would split differently on the way back
    let chunks: Vec<String> = chunks
        .into_iter()
        .filter(|c| !c.is_empty() && !c.contains("\n\n") && !c.starts_with('\n') && !c.ends_with('\n'))
        .collect();
    let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
    let top_k = top_k as usize;

    let out = rerank(&OverlapScorer, &query, &refs, top_k).unwrap();
    let kept = split_chunks(&out);

    kept.len() <= top_k && kept.len() <= refs.len() && kept.iter().all(|k| refs.contains(k))
}

#[quickcheck]
fn prop_rerank_keeps_min_of_top_k_and_input(n: u8, top_k: u8) -> bool {
    let chunks: Vec<String> = (0..n % 20).map(|i| format!("chunk {}", i)).collect();
    let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
    let top_k = (top_k % 25) as usize;

    let out = rerank(&OverlapScorer, "chunk 3", &refs, top_k).unwrap();
    split_chunks(&out).len() == top_k.min(refs.len())
}

#[quickcheck]
fn prop_thinking_fragments_are_removed(before: String, inner: String, after: String) -> bool {
    if [&before, &inner, &after].iter().any(|s| s.contains('<')) {
        return true;
    }
    let message = format!("{}<think>{}</think>{}", before, inner, after);
    let (visible, thinking) = process_message(&message);

    thinking == vec![inner] && visible == format!("{}{}", before, after).trim()
}
