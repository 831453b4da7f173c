use crate::SimulationError;
use crate::messages::{CrossChainMessage, dispatch};
use idf_api_types::{Notification, WalletAddress};
use idf_chain_registry::{POLYGON, ROOTSTOCK};
use idf_provider::units::parse_units;
use idf_verification::VerificationGate;
use rand::Rng;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub symbol: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub decimals: u8,
    pub chain_id: u64,
}

pub const TOKENS: &[Token] = &[
    Token {
        symbol: "ETH",
        name: "Ethereum",
        address: "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE",
        decimals: 18,
        chain_id: 1,
    },
    Token {
        symbol: "USDC",
        name: "USD Coin",
        address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        decimals: 6,
        chain_id: 1,
    },
    Token {
        symbol: "USDT",
        name: "Tether USD",
        address: "0xdAC17F958D2ee523a2206206994597C13D831ec7",
        decimals: 6,
        chain_id: 1,
    },
    Token {
        symbol: "DAI",
        name: "Dai Stablecoin",
        address: "0x6B175474E89094C44Da98b954EedeAC495271d0F",
        decimals: 18,
        chain_id: 1,
    },
    Token {
        symbol: "WBTC",
        name: "Wrapped BTC",
        address: "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599",
        decimals: 8,
        chain_id: 1,
    },
    Token {
        symbol: "LINK",
        name: "ChainLink Token",
        address: "0x514910771AF9Ca656af840dff83E8264EcF986CA",
        decimals: 18,
        chain_id: 1,
    },
    Token {
        symbol: "UNI",
        name: "Uniswap",
        address: "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984",
        decimals: 18,
        chain_id: 1,
    },
    Token {
        symbol: "AAVE",
        name: "Aave Token",
        address: "0x7Fc66500c84A76Ad7e9c93437bFc5Ac33E2DDaE9",
        decimals: 18,
        chain_id: 1,
    },
    Token {
        symbol: "MATIC",
        name: "Polygon",
        address: "0x7D1AfA7B718fb893dB30A3aBc0Cfc608AaCfeBB0",
        decimals: 18,
        chain_id: 1,
    },
    Token {
        symbol: "SHIB",
        name: "Shiba Inu",
        address: "0x95aD61b0a150d79219dCF64E1E6Cc01f0B64C4cE",
        decimals: 18,
        chain_id: 1,
    },
    Token {
        symbol: "RBTC",
        name: "Rootstock Bitcoin",
        address: "0x542fDA317318eBF1d3DEAf76E0b632741A7e677d",
        decimals: 18,
        chain_id: 30,
    },
    Token {
        symbol: "RIF",
        name: "RSK Infrastructure Framework",
        address: "0x2acc95758f8b5f583470ba265eb685a8f45fc9d5",
        decimals: 18,
        chain_id: 30,
    },
];

const STABLECOINS: &[&str] = &["USDC", "USDT", "DAI"];

pub fn find_token(symbol: &str) -> Option<&'static Token> {
    TOKENS.iter().find(|t| t.symbol.eq_ignore_ascii_case(symbol))
}

/// Samples a market rate for `from -> to`. Known pairs stay inside a
/// realistic band; anything else gets a rate between 0.1 and 10.1.
pub fn sample_rate<R: Rng + ?Sized>(from: &Token, to: &Token, rng: &mut R) -> f64 {
    let stable = |t: &Token| STABLECOINS.contains(&t.symbol);
    match (from.symbol, to.symbol) {
        ("ETH", "USDC") => rng.gen_range(1700.0..1900.0),
        ("USDC", "ETH") => 1.0 / rng.gen_range(1700.0..1900.0),
        ("ETH", "WBTC") => rng.gen_range(0.055..0.065),
        ("WBTC", "ETH") => rng.gen_range(15.0..17.0),
        _ if stable(from) && stable(to) => rng.gen_range(0.98..1.02),
        ("ETH", "RBTC") => rng.gen_range(1.0..1.02),
        ("RBTC", "ETH") => rng.gen_range(0.98..1.0),
        ("RBTC", "RIF") => rng.gen_range(9500.0..10500.0),
        ("RIF", "RBTC") => 1.0 / rng.gen_range(9500.0..10500.0),
        _ => rng.gen_range(0.1..10.1),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapQuote {
    /// Base units of the source token.
    pub from_token_amount: u128,
    /// Base units of the target token, from the output rounded to 6 places.
    pub to_token_amount: u128,
    pub to_amount_display: String,
    pub estimated_gas: u64,
    pub protocol: &'static str,
}

pub fn fee_label(fusion_plus: bool) -> &'static str {
    if fusion_plus { "0.05%" } else { "0.1%" }
}

fn parse_amount(amount: &str, token: &Token) -> Result<(f64, u128), SimulationError> {
    let invalid = || SimulationError::InvalidAmount(amount.to_owned());
    let base = parse_units(amount, token.decimals).ok_or_else(invalid)?;
    let value: f64 = amount.trim().parse().map_err(|_| invalid())?;
    if base == 0 || !value.is_finite() || value <= 0.0 {
        return Err(invalid());
    }
    Ok((value, base))
}

pub fn simulate_quote<R: Rng + ?Sized>(
    from: &Token,
    to: &Token,
    amount: &str,
    fusion_plus: bool,
    rng: &mut R,
) -> Result<SwapQuote, SimulationError> {
    if from.symbol == to.symbol {
        return Err(SimulationError::SameToken);
    }
    let (value, from_token_amount) = parse_amount(amount, from)?;

    let output = value * sample_rate(from, to, rng);
    let to_amount_display = format!("{output:.6}");
    let to_token_amount = parse_units(&to_amount_display, to.decimals)
        .ok_or_else(|| SimulationError::InvalidAmount(to_amount_display.clone()))?;

    Ok(SwapQuote {
        from_token_amount,
        to_token_amount,
        to_amount_display,
        estimated_gas: 100_000 + rng.gen_range(0..50_000),
        protocol: if fusion_plus { "Fusion+" } else { "Uniswap V3" },
    })
}

/// What the swap card shows for the current input.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteView {
    pub quote: SwapQuote,
    /// Output for one unit of the source token, 6 places.
    pub rate: String,
    pub fee: &'static str,
}

/// Who is swapping, as far as the announcement is concerned.
#[derive(Debug, Clone, Copy)]
pub struct Swapper<'a> {
    pub address: &'a WalletAddress,
    pub display_name: Option<&'a str>,
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SwapReceipt {
    pub message_hash: String,
    pub message: CrossChainMessage,
    pub notification: Notification,
}

/// Swap form state. Quotes and swaps are refused until the gate opens.
pub struct SwapForm {
    gate: VerificationGate,
    pub from: &'static Token,
    pub to: &'static Token,
    pub fusion_plus: bool,
}

impl SwapForm {
    /// Starts on ETH -> USDC with Fusion+ enabled.
    pub fn new(gate: VerificationGate) -> Self {
        Self {
            gate,
            from: &TOKENS[0],
            to: &TOKENS[1],
            fusion_plus: true,
        }
    }

    pub fn select(&mut self, from: &str, to: &str) -> Result<(), SimulationError> {
        self.from = find_token(from).ok_or_else(|| SimulationError::UnknownToken(from.to_owned()))?;
        self.to = find_token(to).ok_or_else(|| SimulationError::UnknownToken(to.to_owned()))?;
        Ok(())
    }

    pub fn flip(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// `Ok(None)` for an empty or zero amount, which clears the output.
    pub fn quote<R: Rng + ?Sized>(
        &self,
        amount: &str,
        rng: &mut R,
    ) -> Result<Option<QuoteView>, SimulationError> {
        if !self.gate.is_verified() {
            return Err(SimulationError::NotVerified);
        }
        let amount = amount.trim();
        if amount.is_empty() || amount.parse::<f64>().is_ok_and(|v| v == 0.0) {
            return Ok(None);
        }

        let quote = simulate_quote(self.from, self.to, amount, self.fusion_plus, rng)?;
        let unit = simulate_quote(self.from, self.to, "1", self.fusion_plus, rng)?;
        Ok(Some(QuoteView {
            quote,
            rate: unit.to_amount_display,
            fee: fee_label(self.fusion_plus),
        }))
    }

    /// Completes a (simulated) swap and announces it to the destination
    /// chain: Rootstock for Rootstock tokens, Polygon otherwise.
    pub fn complete<R: Rng + ?Sized>(
        &self,
        amount: &str,
        received: &str,
        swapper: Swapper<'_>,
        timestamp_ms: u64,
        rng: &mut R,
    ) -> Result<SwapReceipt, SimulationError> {
        if !self.gate.is_verified() {
            return Err(SimulationError::NotVerified);
        }
        if self.from.symbol == self.to.symbol {
            return Err(SimulationError::SameToken);
        }
        parse_amount(amount, self.from)?;

        let to_chain = if self.to.chain_id == ROOTSTOCK.chain_id {
            ROOTSTOCK.chain_id
        } else {
            POLYGON.chain_id
        };
        let message = CrossChainMessage {
            from_chain: swapper.chain_id.unwrap_or(1),
            to_chain,
            payload: json!({
                "type": "VERIFIED_SWAP",
                "fromToken": self.from.symbol,
                "toToken": self.to.symbol,
                "amount": amount.trim(),
                "receivedAmount": received,
                "timestamp": timestamp_ms,
                "address": swapper.address.0,
                "ensName": swapper.display_name,
                "service": "Identifi",
            }),
        };
        let message_hash = dispatch(&message, rng);

        Ok(SwapReceipt {
            message_hash,
            message,
            notification: Notification::success(
                "Swap Successful",
                format!(
                    "Swapped {} {} for {} {}",
                    amount.trim(),
                    self.from.symbol,
                    received,
                    self.to.symbol
                ),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idf_verification::Verification;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn token(symbol: &str) -> &'static Token {
        find_token(symbol).expect("known token")
    }

    async fn verified() -> Verification {
        let verification = Verification::new();
        verification.humanity_flow().verify(async {}).await;
        verification
    }

    #[test]
    fn token_list_covers_mainnet_and_rootstock() {
        assert_eq!(TOKENS.len(), 12);
        assert_eq!(token("usdc").decimals, 6);
        assert_eq!(token("RIF").chain_id, 30);
        assert!(find_token("DOGE").is_none());
    }

    #[test]
    fn rates_stay_inside_their_bands() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let r = sample_rate(token("ETH"), token("USDC"), &mut rng);
            assert!((1700.0..1900.0).contains(&r));
            let r = sample_rate(token("USDT"), token("DAI"), &mut rng);
            assert!((0.98..1.02).contains(&r));
            let r = sample_rate(token("RIF"), token("RBTC"), &mut rng);
            assert!(r > 1.0 / 10500.0 && r <= 1.0 / 9500.0);
            let r = sample_rate(token("UNI"), token("SHIB"), &mut rng);
            assert!((0.1..10.1).contains(&r));
        }
    }

    #[test]
    fn quote_converts_between_decimals() {
        let mut rng = StdRng::seed_from_u64(5);
        let quote =
            simulate_quote(token("ETH"), token("USDC"), "2", true, &mut rng).expect("quote");

        assert_eq!(quote.from_token_amount, 2_000_000_000_000_000_000);
        let out: f64 = quote.to_amount_display.parse().expect("decimal");
        assert!((3400.0..3800.0).contains(&out));
        assert_eq!(quote.to_token_amount, (out * 1e6).round() as u128);
        assert!((100_000..150_000).contains(&quote.estimated_gas));
        assert_eq!(quote.protocol, "Fusion+");
    }

    #[test]
    fn quote_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            simulate_quote(token("ETH"), token("ETH"), "1", false, &mut rng),
            Err(SimulationError::SameToken)
        );
        assert!(matches!(
            simulate_quote(token("ETH"), token("DAI"), "-3", false, &mut rng),
            Err(SimulationError::InvalidAmount(_))
        ));
        assert!(matches!(
            simulate_quote(token("USDC"), token("DAI"), "1.0000001", false, &mut rng),
            Err(SimulationError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn form_refuses_quotes_until_verified() {
        let verification = Verification::new();
        let form = SwapForm::new(verification.gate());
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(form.quote("1", &mut rng), Err(SimulationError::NotVerified));

        verification.humanity_flow().verify(async {}).await;
        let view = form.quote("1", &mut rng).expect("quote").expect("non-empty");
        assert_eq!(view.fee, "0.05%");
        assert_eq!(form.quote("0", &mut rng), Ok(None));
        assert_eq!(form.quote("", &mut rng), Ok(None));
    }

    #[test]
    fn fee_follows_fusion_toggle() {
        assert_eq!(fee_label(true), "0.05%");
        assert_eq!(fee_label(false), "0.1%");
    }

    #[tokio::test]
    async fn completion_targets_rootstock_or_polygon() {
        let verification = verified().await;
        let mut form = SwapForm::new(verification.gate());
        let mut rng = StdRng::seed_from_u64(13);
        let alice = WalletAddress("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".into());
        let swapper = Swapper {
            address: &alice,
            display_name: Some("alice.eth"),
            chain_id: Some(1),
        };

        let receipt = form
            .complete("1", "1800.000000", swapper, 1_700_000_000_000, &mut rng)
            .expect("swap");
        assert_eq!(receipt.message.to_chain, 137);
        assert_eq!(receipt.message.payload["type"], "VERIFIED_SWAP");
        assert_eq!(receipt.message.payload["ensName"], "alice.eth");
        assert_eq!(receipt.message_hash.len(), 66);
        assert_eq!(receipt.notification.description, "Swapped 1 ETH for 1800.000000 USDC");

        form.select("ETH", "RBTC").expect("tokens");
        let anonymous = Swapper {
            address: &alice,
            display_name: None,
            chain_id: None,
        };
        let receipt = form
            .complete("0.5", "0.505000", anonymous, 0, &mut rng)
            .expect("swap");
        assert_eq!(receipt.message.from_chain, 1);
        assert_eq!(receipt.message.to_chain, 30);

        form.flip();
        assert_eq!(form.from.symbol, "RBTC");
        assert_eq!(form.to.symbol, "ETH");
    }

    #[test]
    fn completion_requires_verification() {
        let verification = Verification::new();
        let form = SwapForm::new(verification.gate());
        let mut rng = StdRng::seed_from_u64(1);
        let alice = WalletAddress("0xabc".into());
        let swapper = Swapper {
            address: &alice,
            display_name: None,
            chain_id: Some(1),
        };
        assert!(matches!(
            form.complete("1", "1", swapper, 0, &mut rng),
            Err(SimulationError::NotVerified)
        ));
    }
}
