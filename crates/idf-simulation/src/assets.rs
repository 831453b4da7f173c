use idf_chain_registry::{CELO, ETHEREUM, POLYGON, ROOTSTOCK};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Price {
    pub usd: f64,
    pub change_24h: f64,
}

pub const ETH_PRICE: Price = Price { usd: 1850.0, change_24h: 2.5 };
pub const MATIC_PRICE: Price = Price { usd: 0.65, change_24h: 1.2 };
pub const CELO_PRICE: Price = Price { usd: 0.48, change_24h: -0.8 };
pub const USDC_PRICE: Price = Price { usd: 1.0, change_24h: 0.01 };
pub const LINK_PRICE: Price = Price { usd: 12.75, change_24h: 3.2 };
pub const BTC_PRICE: Price = Price { usd: 52000.0, change_24h: 1.5 };
pub const RIF_PRICE: Price = Price { usd: 0.12, change_24h: -1.2 };

const NATIVE: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub symbol: &'static str,
    pub name: &'static str,
    pub balance: String,
    /// USD value, 2 places.
    pub value: String,
    pub change_24h: f64,
    pub address: &'static str,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAssets {
    pub network: &'static str,
    pub chain_id: u64,
    pub total_value: String,
    pub assets: Vec<Asset>,
}

struct Holding {
    symbol: &'static str,
    name: &'static str,
    address: &'static str,
    decimals: u8,
    price: Price,
    amount: f64,
    places: usize,
}

impl Holding {
    fn into_asset(self) -> (Asset, f64) {
        let balance = format!("{:.*}", self.places, self.amount);
        // Value is computed from the rounded balance the user sees.
        let shown: f64 = balance.parse().unwrap_or(0.0);
        let value = shown * self.price.usd;
        let asset = Asset {
            symbol: self.symbol,
            name: self.name,
            balance,
            value: format!("{value:.2}"),
            change_24h: self.price.change_24h,
            address: self.address,
            decimals: self.decimals,
        };
        (asset, value)
    }
}

fn network(chain: &idf_chain_registry::ChainInfo, holdings: Vec<Holding>) -> NetworkAssets {
    let mut total = 0.0;
    let assets = holdings
        .into_iter()
        .map(|h| {
            let (asset, value) = h.into_asset();
            total += value;
            asset
        })
        .collect();
    NetworkAssets {
        network: chain.name,
        chain_id: chain.chain_id,
        total_value: format!("{total:.2}"),
        assets,
    }
}

/// Simulated holdings across the four supported networks. The Ethereum
/// native balance uses `eth_balance` (the session's ether string) when it
/// parses, otherwise a random amount.
pub fn simulate_portfolio<R: Rng + ?Sized>(
    eth_balance: Option<&str>,
    rng: &mut R,
) -> Vec<NetworkAssets> {
    let eth = eth_balance
        .and_then(|b| b.trim().parse::<f64>().ok())
        .filter(|b| b.is_finite() && *b >= 0.0)
        .unwrap_or_else(|| rng.gen_range(0.0..2.0));

    vec![
        network(
            &ETHEREUM,
            vec![
                Holding {
                    symbol: "ETH",
                    name: "Ethereum",
                    address: NATIVE,
                    decimals: 18,
                    price: ETH_PRICE,
                    amount: eth,
                    places: 6,
                },
                Holding {
                    symbol: "USDC",
                    name: "USD Coin",
                    address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                    decimals: 6,
                    price: USDC_PRICE,
                    amount: rng.gen_range(0.0..1000.0),
                    places: 2,
                },
                Holding {
                    symbol: "LINK",
                    name: "Chainlink",
                    address: "0x514910771AF9Ca656af840dff83E8264EcF986CA",
                    decimals: 18,
                    price: LINK_PRICE,
                    amount: rng.gen_range(0.0..50.0),
                    places: 6,
                },
            ],
        ),
        network(
            &POLYGON,
            vec![
                Holding {
                    symbol: "MATIC",
                    name: "Polygon",
                    address: NATIVE,
                    decimals: 18,
                    price: MATIC_PRICE,
                    amount: rng.gen_range(0.0..100.0),
                    places: 6,
                },
                Holding {
                    symbol: "USDC",
                    name: "USD Coin",
                    address: "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174",
                    decimals: 6,
                    price: USDC_PRICE,
                    amount: rng.gen_range(0.0..50.0),
                    places: 2,
                },
            ],
        ),
        network(
            &CELO,
            vec![
                Holding {
                    symbol: "CELO",
                    name: "Celo",
                    address: NATIVE,
                    decimals: 18,
                    price: CELO_PRICE,
                    amount: rng.gen_range(0.0..20.0),
                    places: 6,
                },
                Holding {
                    symbol: "cUSD",
                    name: "Celo Dollar",
                    address: "0x765DE816845861e75A25fCA122bb6898B8B1282a",
                    decimals: 18,
                    price: USDC_PRICE,
                    amount: rng.gen_range(0.0..30.0),
                    places: 2,
                },
            ],
        ),
        network(
            &ROOTSTOCK,
            vec![
                Holding {
                    symbol: "RBTC",
                    name: "Rootstock Bitcoin",
                    address: NATIVE,
                    decimals: 18,
                    price: BTC_PRICE,
                    amount: rng.gen_range(0.0..0.05),
                    places: 6,
                },
                Holding {
                    symbol: "RIF",
                    name: "RSK Infrastructure Framework",
                    address: "0x2acc95758f8b5f583470ba265eb685a8f45fc9d5",
                    decimals: 18,
                    price: RIF_PRICE,
                    amount: rng.gen_range(0.0..100.0),
                    places: 6,
                },
            ],
        ),
    ]
}

/// Sum of every network total, 2 places.
pub fn portfolio_total(networks: &[NetworkAssets]) -> String {
    let total: f64 = networks
        .iter()
        .filter_map(|n| n.total_value.parse::<f64>().ok())
        .sum();
    format!("{total:.2}")
}
