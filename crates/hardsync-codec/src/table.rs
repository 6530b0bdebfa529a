//! Exchange lookup used by decoders.

use hardsync_contract::{Contract, Exchange, PING_EXCHANGE};
use std::collections::HashMap;

/// Resolves wire identifiers to exchanges.
///
/// Every table contains the built-in `Ping` and `Error` exchanges, so
/// discovery pings and device error reports decode against any contract.
#[derive(Debug, Clone)]
pub struct ExchangeTable {
    exchanges: Vec<Exchange>,
    by_name: HashMap<String, usize>,
    by_binary_id: HashMap<u8, usize>,
}

impl ExchangeTable {
    /// Build a table from a list of exchanges.
    ///
    /// Later entries with a name or binary identifier already present are
    /// ignored; validated contracts never contain such duplicates.
    pub fn new(exchanges: impl IntoIterator<Item = Exchange>) -> Self {
        let mut table = ExchangeTable {
            exchanges: Vec::new(),
            by_name: HashMap::new(),
            by_binary_id: HashMap::new(),
        };
        table.insert(Exchange::ping());
        table.insert(Exchange::error());
        for exchange in exchanges {
            table.insert(exchange);
        }
        table
    }

    /// Build a table covering every exchange of a contract.
    pub fn from_contract(contract: &Contract) -> Self {
        Self::new(contract.exchanges().iter().cloned())
    }

    fn insert(&mut self, exchange: Exchange) {
        if self.by_name.contains_key(exchange.name()) {
            log::warn!("ignoring duplicate exchange `{}`", exchange.name());
            return;
        }
        let index = self.exchanges.len();
        if let Some(&[id]) = exchange.binary_id() {
            self.by_binary_id.entry(id).or_insert(index);
        }
        self.by_name.insert(exchange.name().to_string(), index);
        self.exchanges.push(exchange);
    }

    /// Look up an exchange by name.
    pub fn by_name(&self, name: &str) -> Option<&Exchange> {
        self.by_name.get(name).map(|&index| &self.exchanges[index])
    }

    /// Look up an exchange by its binary identifier, request bit cleared.
    pub fn by_binary_id(&self, id: u8) -> Option<&Exchange> {
        self.by_binary_id.get(&id).map(|&index| &self.exchanges[index])
    }

    /// The built-in `Ping` exchange.
    pub fn ping(&self) -> &Exchange {
        &self.exchanges[self.by_name[PING_EXCHANGE]]
    }

    /// Iterate over all exchanges, built-ins first.
    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    /// Number of exchanges, including the built-ins.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Always false: the table holds at least the built-ins.
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl Default for ExchangeTable {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}
