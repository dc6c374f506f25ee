//! The protected resource: gossip items partitioned by scope (username).

use std::collections::HashMap;

/// Read-only gossip items per scope.
#[derive(Debug, Clone, Default)]
pub struct GossipCatalog {
    items: HashMap<String, Vec<String>>,
}

impl GossipCatalog {
    #[must_use]
    pub fn new(items: HashMap<String, Vec<String>>) -> Self {
        Self { items }
    }

    /// The demo catalog for alice, bob and mallory.
    #[must_use]
    pub fn seeded() -> Self {
        let entry = |scope: &str, items: [&str; 2]| {
            (scope.to_string(), items.iter().map(|s| (*s).to_string()).collect())
        };
        Self::new(HashMap::from([
            entry("alice", ["Oreos are made out of sand.", "Bob stinks."]),
            entry(
                "bob",
                ["Larry Ellison would like to be bought by Oracle.", "Alice has a crush on me."],
            ),
            entry(
                "mallory",
                [
                    "Obama is to blame for climate change.",
                    "There's something going on between Alice and Bob.",
                ],
            ),
        ]))
    }

    /// Items for `scope`, if a resource exists for it.
    #[must_use]
    pub fn get(&self, scope: &str) -> Option<&[String]> {
        self.items.get(scope).map(Vec::as_slice)
    }
}
