use idf_api_types::{AddChainParameter, ChainId, NativeCurrency};
use serde::Serialize;

/// Static description of a network the dashboard knows how to display and
/// how to register with a wallet.
#[derive(Debug, Clone, Serialize)]
pub struct ChainInfo {
    pub chain_id: u64,
    /// Short name shown in the UI ("Polygon").
    pub name: &'static str,
    /// Name submitted to wallets when the network has to be added ("Polygon Mainnet").
    pub network_name: &'static str,
    pub currency_name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub rpc_urls: &'static [&'static str],
    pub explorer_urls: &'static [&'static str],
}

impl ChainInfo {
    pub fn id(&self) -> ChainId {
        ChainId(self.chain_id)
    }

    pub fn explorer_url(&self) -> &'static str {
        self.explorer_urls.first().copied().unwrap_or(DEFAULT_EXPLORER)
    }

    /// EIP-3085 payload for `wallet_addEthereumChain`.
    pub fn add_chain_parameter(&self) -> AddChainParameter {
        AddChainParameter {
            chain_id: self.id().to_hex(),
            chain_name: self.network_name.to_owned(),
            native_currency: NativeCurrency {
                name: self.currency_name.to_owned(),
                symbol: self.symbol.to_owned(),
                decimals: self.decimals,
            },
            rpc_urls: self.rpc_urls.iter().map(|url| (*url).to_owned()).collect(),
            block_explorer_urls: self
                .explorer_urls
                .iter()
                .map(|url| (*url).to_owned())
                .collect(),
        }
    }
}

const DEFAULT_EXPLORER: &str = "https://etherscan.io";

pub const ETHEREUM: ChainInfo = ChainInfo {
    chain_id: 1,
    name: "Ethereum",
    network_name: "Ethereum Mainnet",
    currency_name: "Ether",
    symbol: "ETH",
    decimals: 18,
    rpc_urls: &["https://eth.llamarpc.com"],
    explorer_urls: &["https://etherscan.io"],
};

pub const POLYGON: ChainInfo = ChainInfo {
    chain_id: 137,
    name: "Polygon",
    network_name: "Polygon Mainnet",
    currency_name: "MATIC",
    symbol: "MATIC",
    decimals: 18,
    rpc_urls: &["https://polygon-rpc.com/"],
    explorer_urls: &["https://polygonscan.com/"],
};

pub const CELO: ChainInfo = ChainInfo {
    chain_id: 42220,
    name: "Celo",
    network_name: "Celo Mainnet",
    currency_name: "CELO",
    symbol: "CELO",
    decimals: 18,
    rpc_urls: &["https://forno.celo.org"],
    explorer_urls: &["https://explorer.celo.org"],
};

pub const ROOTSTOCK: ChainInfo = ChainInfo {
    chain_id: 30,
    name: "Rootstock",
    network_name: "Rootstock Mainnet",
    currency_name: "Smart Bitcoin",
    symbol: "RBTC",
    decimals: 18,
    rpc_urls: &["https://public-node.rsk.co"],
    explorer_urls: &["https://explorer.rootstock.io"],
};

const ALL_CHAINS: &[&ChainInfo] = &[&ETHEREUM, &POLYGON, &CELO, &ROOTSTOCK];

pub fn get_chain(chain_id: u64) -> Option<&'static ChainInfo> {
    ALL_CHAINS.iter().find(|c| c.chain_id == chain_id).copied()
}

pub fn supported_chains() -> Vec<&'static ChainInfo> {
    ALL_CHAINS.to_vec()
}

pub fn chain_display_name(chain_id: Option<u64>) -> String {
    match chain_id {
        None => "Unknown Network".to_owned(),
        Some(id) => match get_chain(id) {
            Some(chain) => chain.name.to_owned(),
            None => format!("Chain ID: {id}"),
        },
    }
}

/// Explorer page for an address. Unknown chains fall back to Etherscan.
pub fn explorer_address_url(chain_id: u64, address: &str) -> String {
    let base = get_chain(chain_id)
        .map(ChainInfo::explorer_url)
        .unwrap_or(DEFAULT_EXPLORER);
    format!("{}/address/{}", base.trim_end_matches('/'), address)
}

pub fn add_chain_parameter(chain_id: u64) -> Option<AddChainParameter> {
    get_chain(chain_id).map(ChainInfo::add_chain_parameter)
}
