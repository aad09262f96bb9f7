use indexmap::IndexMap;

use super::types::{CacheGroup, ChunkScope, ModuleIds, Optimization, SplitChunks};
use crate::environment::Mode;

/// Cache group pulling the listed vendor packages into one chunk
fn vendor_cache_group(vendors: &[String]) -> Option<CacheGroup> {
    if vendors.is_empty() {
        return None;
    }

    let alternatives: Vec<String> = vendors.iter().map(|v| regex::escape(v)).collect();
    Some(CacheGroup {
        test: format!(r"[\\/]node_modules[\\/]({})[\\/]", alternatives.join("|")),
        name: "vendors".to_string(),
        chunks: ChunkScope::All,
    })
}

pub(crate) fn optimization(mode: Mode, vendors: &[String]) -> Optimization {
    let mut cache_groups = IndexMap::new();
    if let Some(group) = vendor_cache_group(vendors) {
        cache_groups.insert("vendor".to_string(), group);
    }

    match mode {
        Mode::Production => Optimization {
            minimize: true,
            module_ids: ModuleIds::Hashed,
            runtime_chunk: Some("single".to_string()),
            split_chunks: SplitChunks {
                chunks: ChunkScope::All,
                cache_groups,
            },
        },
        Mode::Development => Optimization {
            minimize: false,
            module_ids: ModuleIds::Named,
            runtime_chunk: None,
            split_chunks: SplitChunks {
                chunks: ChunkScope::Async,
                cache_groups,
            },
        },
    }
}
