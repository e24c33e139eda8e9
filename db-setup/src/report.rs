//! Operator-facing progress report
//!
//! Everything here is for a human reading the terminal. Diagnostics that
//! belong in logs go through `tracing` instead.

use crate::error::ServiceError;
use crate::setup::{ScriptPaths, Verification};
use std::io::{self, Write};

const RULE_WIDTH: usize = 80;

/// Tables the schema script creates.
pub const EXPECTED_TABLES: [&str; 10] = [
    "user_profiles",
    "exchange_connections (Kraken, Binance US, Coinbase)",
    "wallet_connections (MetaMask, WalletConnect, etc.)",
    "price_history",
    "trading_orders",
    "transactions",
    "portfolio_holdings",
    "trading_strategies",
    "price_alerts",
    "dashboard_stats",
];

/// Sample assets the seed script inserts: symbol, name, data points.
pub const SAMPLE_ASSETS: [(&str, &str, u32); 5] = [
    ("BTC", "Bitcoin", 5),
    ("ETH", "Ethereum", 5),
    ("SOL", "Solana", 3),
    ("ADA", "Cardano", 2),
    ("MATIC", "Polygon", 2),
];

const NEXT_STEPS: [&str; 4] = [
    "Add exchange API credentials via the Trading page",
    "Connect DeFi wallets via the Wallet Connect button",
    "Start monitoring crypto prices in real-time",
    "Create trading strategies and set price alerts",
];

/// Writes the setup report to a terminal or any other sink.
pub struct Console<W: Write> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))
    }

    fn heading(&mut self, title: &str) -> io::Result<()> {
        self.rule()?;
        writeln!(self.out, "{}", title)?;
        self.rule()
    }

    fn bullet(&mut self, item: &str) -> io::Result<()> {
        writeln!(self.out, "  • {}", item)
    }

    fn failure(&mut self, what: &str, err: &ServiceError) -> io::Result<()> {
        writeln!(self.out, "\n✗ {}: {}", what, err)?;
        writeln!(self.out, "  Hint: {}", err.remediation())
    }

    pub fn banner(&mut self) -> io::Result<()> {
        self.heading("CRYPTO TRADING PLATFORM - DATABASE SETUP")
    }

    pub fn reading_scripts(&mut self) -> io::Result<()> {
        writeln!(self.out, "\nReading SQL scripts...")
    }

    pub fn scripts_loaded(&mut self) -> io::Result<()> {
        writeln!(self.out, "SQL scripts loaded successfully")
    }

    pub fn step(&mut self, number: u8, title: &str) -> io::Result<()> {
        writeln!(self.out)?;
        self.heading(&format!("STEP {}: {}", number, title))
    }

    pub fn schema_applied(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n✓ Schema creation completed successfully!")?;
        writeln!(self.out, "\nTables created:")?;
        for table in EXPECTED_TABLES {
            self.bullet(table)?;
        }
        writeln!(self.out, "\n✓ Row Level Security (RLS) policies enabled")?;
        writeln!(self.out, "✓ Indexes created for performance")?;
        writeln!(self.out, "✓ Triggers configured for auto-updates")
    }

    pub fn schema_failed(&mut self, err: &ServiceError, paths: &ScriptPaths) -> io::Result<()> {
        self.failure("Error creating schema", err)?;
        writeln!(
            self.out,
            "\nNOTE: 'relation does not exist' errors are expected on a fresh project;"
        )?;
        writeln!(self.out, "      the scripts can be run from the Supabase SQL Editor instead.")?;
        writeln!(self.out, "\nPlease run the following scripts manually in Supabase SQL Editor:")?;
        writeln!(self.out, "  1. {}", paths.schema.display())?;
        writeln!(self.out, "  2. {}", paths.seed.display())
    }

    pub fn seed_applied(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n✓ Sample data seeded successfully!")?;
        writeln!(self.out, "\nSample cryptocurrencies added:")?;
        for (symbol, name, points) in SAMPLE_ASSETS {
            self.bullet(&format!("{} ({}) - {} historical data points", symbol, name, points))?;
        }
        Ok(())
    }

    pub fn seed_failed(&mut self, err: &ServiceError) -> io::Result<()> {
        self.failure("Error seeding data", err)
    }

    pub fn verified(&mut self, verification: &Verification) -> io::Result<()> {
        writeln!(self.out, "\n✓ Database connection successful!")?;
        writeln!(
            self.out,
            "✓ Found {} price history records",
            verification.count
        )?;
        writeln!(
            self.out,
            "✓ Available symbols: {}",
            verification.symbol_list()
        )
    }

    pub fn verification_failed(&mut self, err: &ServiceError) -> io::Result<()> {
        self.failure("Verification failed", err)?;
        writeln!(
            self.out,
            "\nPlease ensure the SQL scripts have been executed in Supabase."
        )
    }

    pub fn complete(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.heading("DATABASE SETUP COMPLETE!")?;
        writeln!(self.out, "\nNext steps:")?;
        for (i, step) in NEXT_STEPS.iter().enumerate() {
            writeln!(self.out, "  {}. {}", i + 1, step)?;
        }
        writeln!(self.out)?;
        self.rule()?;
        self.out.flush()
    }
}
