//! Fill the logical-path fields of decoded oracle results.
//!
//! Physical fields are left untouched; logical ones are written next to them.
//! Order and length always follow the oracle's output.

use crate::model::{CallersResult, ImplementsResult, PeersResult, ReferrersResult};
use crate::resolve::Resolver;

pub trait Translate {
    fn translate(&mut self, resolver: &Resolver<'_>);
}

fn logical_list(resolver: &Resolver<'_>, physical: &[String]) -> Vec<String> {
    physical
        .iter()
        .map(|pos| resolver.resolve_logical(pos))
        .collect()
}

impl Translate for ImplementsResult {
    fn translate(&mut self, resolver: &Resolver<'_>) {
        let implements = &mut self.implements;
        for entry in implements.fromptr.iter_mut().chain(implements.to.iter_mut()) {
            entry.logical_pos = resolver.resolve_logical(&entry.pos);
        }
    }
}

impl Translate for ReferrersResult {
    fn translate(&mut self, resolver: &Resolver<'_>) {
        self.referrers.logical_refs = logical_list(resolver, &self.referrers.refs);
    }
}

impl Translate for CallersResult {
    fn translate(&mut self, resolver: &Resolver<'_>) {
        for caller in &mut self.callers {
            caller.logical_pos = resolver.resolve_logical(&caller.pos);
        }
    }
}

impl Translate for PeersResult {
    fn translate(&mut self, resolver: &Resolver<'_>) {
        let peers = &mut self.peers;
        peers.logical_allocs = logical_list(resolver, &peers.allocs);
        peers.logical_sends = logical_list(resolver, &peers.sends);
        peers.logical_receives = logical_list(resolver, &peers.receives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Caller, Implements, ImplementsType, Peers, Referrers};
    use crate::resolve::TieBreak;
    use crate::roots::SourceRoots;
    use std::path::PathBuf;

    fn roots() -> SourceRoots {
        SourceRoots::new(
            vec![PathBuf::from("/roots/r1"), PathBuf::from("/roots/r2")],
            PathBuf::from("/go/src"),
        )
    }

    fn entry(pos: &str) -> ImplementsType {
        ImplementsType {
            name: "T".to_string(),
            pos: pos.to_string(),
            logical_pos: String::new(),
            kind: "struct".to_string(),
        }
    }

    #[test]
    fn implements_sets_logical_pos_on_both_lists() {
        let roots = roots();
        let resolver = Resolver::new(&roots, TieBreak::FirstMatch);
        let mut result = ImplementsResult {
            implements: Implements {
                fromptr: vec![entry("/roots/r2/pkg/foo.go:12:3")],
                to: vec![entry("/go/src/io/io.go:1:1"), entry("/elsewhere/x.go:2:2")],
            },
        };
        result.translate(&resolver);
        assert_eq!(result.implements.fromptr[0].logical_pos, "/pkg/foo.go:12:3");
        assert_eq!(result.implements.fromptr[0].pos, "/roots/r2/pkg/foo.go:12:3");
        assert_eq!(result.implements.to[0].logical_pos, "/GOROOT/io/io.go:1:1");
        assert_eq!(result.implements.to[1].logical_pos, "/elsewhere/x.go:2:2");
    }

    #[test]
    fn referrers_keep_order_and_duplicates() {
        let roots = roots();
        let resolver = Resolver::new(&roots, TieBreak::FirstMatch);
        let refs = vec![
            "/roots/r1/b.go:3:1".to_string(),
            "/roots/r1/a.go:1:1".to_string(),
            "/roots/r1/a.go:1:1".to_string(),
        ];
        let mut result = ReferrersResult {
            referrers: Referrers {
                logical_refs: vec!["stale".to_string()],
                refs: refs.clone(),
            },
        };
        result.translate(&resolver);
        assert_eq!(result.referrers.refs, refs);
        assert_eq!(
            result.referrers.logical_refs,
            vec!["/b.go:3:1", "/a.go:1:1", "/a.go:1:1"]
        );
    }

    #[test]
    fn callers_get_logical_pos() {
        let roots = roots();
        let resolver = Resolver::new(&roots, TieBreak::FirstMatch);
        let mut result = CallersResult {
            callers: vec![Caller {
                desc: "static function call".to_string(),
                pos: "/roots/r1/main.go:9:2".to_string(),
                logical_pos: String::new(),
            }],
        };
        result.translate(&resolver);
        assert_eq!(result.callers[0].logical_pos, "/main.go:9:2");
    }

    #[test]
    fn peers_lists_map_one_to_one() {
        let roots = roots();
        let resolver = Resolver::new(&roots, TieBreak::FirstMatch);
        let mut result = PeersResult {
            peers: Peers {
                allocs: vec!["/roots/r1/c.go:1:1".to_string()],
                sends: vec![
                    "/roots/r1/c.go:2:1".to_string(),
                    "/roots/r2/d.go:2:1".to_string(),
                ],
                receives: Vec::new(),
                ..Peers::default()
            },
        };
        result.translate(&resolver);
        assert_eq!(result.peers.logical_allocs, vec!["/c.go:1:1"]);
        assert_eq!(result.peers.logical_sends, vec!["/c.go:2:1", "/d.go:2:1"]);
        assert!(result.peers.logical_receives.is_empty());
    }
}
