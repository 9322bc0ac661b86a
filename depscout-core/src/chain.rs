//! Chain identity lookups.
//!
//! Both tables are scanned in order and the first hit wins, so entry order
//! encodes specificity ("arbitrum nova" before "arb", "mainnet" last).

/// `(substring, chain id)` pairs matched against lower-cased text.
pub const CHAIN_KEYWORDS: &[(&str, u64)] = &[
    ("arbitrum nova", 42170),
    ("arbitrum goerli", 42170),
    ("boba avax", 43288),
    ("boba bnb", 56288),
    ("huobi eco", 128),
    ("polygon zk", 1101),
    ("zksync era", 324),
    ("arb", 42161),
    ("fuse", 122),
    ("celo", 42220),
    ("heco", 128),
    ("bittorrent", 199),
    ("gnosis", 100),
    ("metis", 1088),
    ("kava", 2222),
    ("opbnb", 204),
    ("bsc", 56),
    ("bnb", 56),
    ("binance", 56),
    ("eth", 1),
    ("fantom", 250),
    ("optim", 10),
    ("sepolia", 11155111),
    ("base", 8453),
    ("moonbeam", 1284),
    ("zkevm", 1101),
    ("linea", 59144),
    ("aurora", 1313161554),
    ("polygon", 137),
    ("aval", 43114),
    ("avax", 43114),
    ("boba", 288),
    ("evmos", 9001),
    ("harmony", 1666600000),
    ("moonriv", 1285),
    ("zksync", 324),
    ("goerli", 5),
    // fallback when nothing more specific matched
    ("mainnet", 1),
];

/// `(explorer prefix, chain id)` pairs matched against link text.
pub const EXPLORERS: &[(&str, u64)] = &[
    ("https://bscscan.com", 56),
    ("https://etherscan.io", 1),
    ("https://ftmscan.com", 250),
    ("https://optimistic.etherscan.io", 10),
    ("https://arbiscan.io", 42161),
    ("https://snowtrace.io", 43114),
    ("https://polygonscan.com", 137),
    ("https://celoscan.io", 42220),
    ("https://gnosisscan.io", 100),
    ("https://goerli.etherscan.io", 5),
    ("https://testnet.bscscan.com", 97),
    ("https://bttcscan.com", 199),
    ("https://zkevm.polygonscan.com", 1101),
    ("https://testnet.ftmscan.com", 4002),
    ("https://testnet.snowtrace.io", 43113),
    ("https://alfajores.celoscan.io", 44787),
    ("https://testnet.polygonscan.com", 80001),
    ("https://goerli.arbiscan.io", 421613),
    ("https://sepolia.etherscan.io", 11155111),
    ("https://basescan.org", 8453),
    ("https://moonbeam.moonscan.io", 1284),
    ("https://moonriver.moonscan.io", 1285),
    ("https://aurorascan.dev", 1313161554),
    ("https://routescan.io/v2/network/mainnet/evm/288/etherscan", 288),
    ("https://explorer.dogechain.dog", 2000),
    ("https://block-explorer-mainnet.zksync.io", 324),
    ("https://lineascan.build", 59144),
    ("https://andromeda-explorer.metis.io", 1088),
    ("https://kavascan.com", 2222),
    ("https://nova-explorer.arbitrum.io", 42170),
    ("https://blockexplorer.avax.boba.network", 43288),
    ("https://blockexplorer.bnb.boba.network", 56288),
    ("https://explorer.fuse.io", 122),
];

/// Chain id for the first keyword contained in `text` (case-insensitive).
pub fn chain_id_from_text(text: &str) -> Option<u64> {
    let lowered = text.to_lowercase();
    CHAIN_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, id)| *id)
}

/// True when the text names any known chain.
pub fn mentions_chain(text: &str) -> bool {
    chain_id_from_text(text).is_some()
}

/// Chain id of an explorer link, but only when the link points at
/// `/address/<address>` for this very address.
pub fn chain_id_from_link(link: &str, address: &str) -> Option<u64> {
    let needle = format!("/address/{}", address.to_lowercase());
    if !link.to_lowercase().contains(&needle) {
        return None;
    }

    EXPLORERS
        .iter()
        .find(|(explorer, _)| link.contains(explorer))
        .map(|(_, id)| *id)
}

/// First link that resolves to a chain id for `address`.
pub fn chain_id_from_links<'a, I>(links: I, address: &str) -> Option<u64>
where
    I: IntoIterator<Item = &'a str>,
{
    links
        .into_iter()
        .find_map(|link| chain_id_from_link(link, address))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const OTHER: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[test]
    fn test_specific_keywords_win() {
        assert_eq!(chain_id_from_text("Arbitrum Nova"), Some(42170));
        assert_eq!(chain_id_from_text("Arbitrum One"), Some(42161));
        assert_eq!(chain_id_from_text("zkSync Era"), Some(324));
        assert_eq!(chain_id_from_text("opBNB"), Some(204));
        assert_eq!(chain_id_from_text("BNB Chain"), Some(56));
    }

    #[test]
    fn test_mainnet_is_last_resort() {
        assert_eq!(chain_id_from_text("Mainnet"), Some(1));
        assert_eq!(chain_id_from_text("Polygon Mainnet"), Some(137));
        assert_eq!(chain_id_from_text("Contract"), None);
    }

    #[test]
    fn test_explorer_link_requires_matching_address() {
        let link = format!("https://etherscan.io/address/{}", ADDR);
        assert_eq!(chain_id_from_link(&link, ADDR), Some(1));
        assert_eq!(chain_id_from_link(&link, OTHER), None);
    }

    #[test]
    fn test_explorer_link_is_case_insensitive_on_address() {
        let link = "https://bscscan.com/address/0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA#code";
        assert_eq!(chain_id_from_link(link, ADDR), Some(56));
    }

    #[test]
    fn test_subdomain_explorers_do_not_collide() {
        let op = format!("https://optimistic.etherscan.io/address/{}", ADDR);
        let goerli = format!("https://goerli.etherscan.io/address/{}", ADDR);
        assert_eq!(chain_id_from_link(&op, ADDR), Some(10));
        assert_eq!(chain_id_from_link(&goerli, ADDR), Some(5));
    }

    #[test]
    fn test_unknown_explorer() {
        let link = format!("https://example.com/address/{}", ADDR);
        assert_eq!(chain_id_from_link(&link, ADDR), None);
    }

    #[test]
    fn test_first_resolving_link_wins() {
        let links = vec![
            "https://github.com/org/repo".to_string(),
            format!("https://polygonscan.com/address/{}", ADDR),
            format!("https://etherscan.io/address/{}", ADDR),
        ];
        assert_eq!(
            chain_id_from_links(links.iter().map(String::as_str), ADDR),
            Some(137)
        );
    }
}
