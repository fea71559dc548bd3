//! Shared fixtures: a small backtesting object model.
//!
//! `Instrument` is the base of `Equity` and `OptionContract`. A `Portfolio`
//! holds `Position`s, each referring to an instrument polymorphically and to
//! its last `Quote`.

#![allow(dead_code)]

use bt_archive::{
    Archivable, ArchiveError, ArchiveReader, ArchiveWriter, Result, TypeRegistry, binary, xml,
};
use chrono::{NaiveDate, NaiveDateTime};
use tracing_subscriber::EnvFilter;

/// Route archive events to the test output. Set `RUST_LOG=bt_archive=trace`
/// to see frame skips and type fallbacks.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =========================================================================
// Instruments
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instrument {
    pub symbol: Option<String>,
    pub exchange: Option<String>,
}

impl Instrument {
    pub fn new(symbol: &str, exchange: &str) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            exchange: Some(exchange.to_string()),
        }
    }

    fn write_base(&self, out: &mut dyn ArchiveWriter) -> Result<()> {
        out.write_string("symbol", self.symbol.as_deref())?;
        out.write_string("exchange", self.exchange.as_deref())
    }

    fn read_base(&mut self, input: &mut dyn ArchiveReader) -> Result<()> {
        self.symbol = input.read_string("symbol")?;
        self.exchange = input.read_string("exchange")?;
        Ok(())
    }
}

impl Archivable for Instrument {
    fn type_hierarchy(&self) -> &'static [&'static str] {
        &["Instrument"]
    }

    fn prototype(&self) -> Box<dyn Archivable> {
        Box::new(Instrument::default())
    }

    fn write_fields(&self, out: &mut dyn ArchiveWriter) -> Result<()> {
        self.write_base(out)
    }

    fn read_fields(&mut self, input: &mut dyn ArchiveReader) -> Result<()> {
        self.read_base(input)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Equity {
    pub base: Instrument,
    pub lot_size: Option<i64>,
    pub listed_on: Option<NaiveDate>,
}

impl Archivable for Equity {
    fn type_hierarchy(&self) -> &'static [&'static str] {
        &["Equity", "Instrument"]
    }

    fn prototype(&self) -> Box<dyn Archivable> {
        Box::new(Equity::default())
    }

    fn write_fields(&self, out: &mut dyn ArchiveWriter) -> Result<()> {
        self.base.write_base(out)?;
        out.write_i64("lot_size", self.lot_size)?;
        out.write_day("listed_on", self.listed_on)
    }

    fn read_fields(&mut self, input: &mut dyn ArchiveReader) -> Result<()> {
        self.base.read_base(input)?;
        self.lot_size = input.read_i64("lot_size")?;
        self.listed_on = input.read_day("listed_on")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionContract {
    pub base: Instrument,
    pub strike: Option<f64>,
    pub expiry: Option<NaiveDate>,
    pub is_call: Option<bool>,
    pub multiplier: i32,
    pub underlying: Option<Equity>,
}

impl Archivable for OptionContract {
    fn type_hierarchy(&self) -> &'static [&'static str] {
        &["OptionContract", "Instrument"]
    }

    fn prototype(&self) -> Box<dyn Archivable> {
        Box::new(OptionContract::default())
    }

    fn write_fields(&self, out: &mut dyn ArchiveWriter) -> Result<()> {
        self.base.write_base(out)?;
        out.write_f64("strike", self.strike)?;
        out.write_day("expiry", self.expiry)?;
        out.write_bool("is_call", self.is_call)?;
        out.write_i32("multiplier", self.multiplier)?;
        out.write_object(
            "underlying",
            self.underlying.as_ref().map(|e| e as &dyn Archivable),
        )
    }

    fn read_fields(&mut self, input: &mut dyn ArchiveReader) -> Result<()> {
        self.base.read_base(input)?;
        self.strike = input.read_f64("strike")?;
        self.expiry = input.read_day("expiry")?;
        self.is_call = input.read_bool("is_call")?;
        self.multiplier = input.read_i32("multiplier")?;
        self.underlying = input.read_object_as::<Equity>("underlying")?;
        Ok(())
    }
}

/// Any of the instrument variants, for fields that hold one polymorphically.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyInstrument {
    Base(Instrument),
    Equity(Equity),
    Option(OptionContract),
}

impl AnyInstrument {
    pub fn as_archivable(&self) -> &dyn Archivable {
        match self {
            Self::Base(v) => v,
            Self::Equity(v) => v,
            Self::Option(v) => v,
        }
    }

    pub fn from_archived(value: Box<dyn Archivable>) -> Result<Self> {
        if value.is::<Equity>() {
            if let Some(v) = value.downcast::<Equity>() {
                return Ok(Self::Equity(*v));
            }
        } else if value.is::<OptionContract>() {
            if let Some(v) = value.downcast::<OptionContract>() {
                return Ok(Self::Option(*v));
            }
        } else if let Some(v) = value.downcast::<Instrument>() {
            return Ok(Self::Base(*v));
        }
        Err(ArchiveError::UnexpectedType {
            expected: "instrument",
            found: String::from("other"),
        })
    }
}

// =========================================================================
// Market data and holdings
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quote {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    // Fields below were added after the first format version.
    pub bid_size: i32,
    pub venue_code: i8,
    pub spread_bps: f32,
    pub at: Option<NaiveDateTime>,
    pub raw: Option<Vec<u8>>,
}

impl Archivable for Quote {
    fn type_hierarchy(&self) -> &'static [&'static str] {
        &["Quote"]
    }

    fn prototype(&self) -> Box<dyn Archivable> {
        Box::new(Quote::default())
    }

    fn write_fields(&self, out: &mut dyn ArchiveWriter) -> Result<()> {
        out.write_f64("bid", self.bid)?;
        out.write_f64("ask", self.ask)?;
        out.write_i32("bid_size", self.bid_size)?;
        out.write_i8("venue_code", self.venue_code)?;
        out.write_f32("spread_bps", self.spread_bps)?;
        out.write_timestamp("at", self.at)?;
        out.write_bytes("raw", self.raw.as_deref())
    }

    fn read_fields(&mut self, input: &mut dyn ArchiveReader) -> Result<()> {
        self.bid = input.read_f64("bid")?;
        self.ask = input.read_f64("ask")?;
        if !input.has_remaining() {
            return Ok(());
        }
        self.bid_size = input.read_i32("bid_size")?;
        self.venue_code = input.read_i8("venue_code")?;
        self.spread_bps = input.read_f32("spread_bps")?;
        self.at = input.read_timestamp("at")?;
        self.raw = input.read_bytes("raw")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    pub instrument: Option<AnyInstrument>,
    pub quantity: i32,
    pub avg_price: Option<f64>,
    pub opened: Option<NaiveDateTime>,
    pub last_quote: Option<Quote>,
}

impl Archivable for Position {
    fn type_hierarchy(&self) -> &'static [&'static str] {
        &["Position"]
    }

    fn prototype(&self) -> Box<dyn Archivable> {
        Box::new(Position::default())
    }

    fn write_fields(&self, out: &mut dyn ArchiveWriter) -> Result<()> {
        out.write_object(
            "instrument",
            self.instrument.as_ref().map(AnyInstrument::as_archivable),
        )?;
        out.write_i32("quantity", self.quantity)?;
        out.write_f64("avg_price", self.avg_price)?;
        out.write_timestamp("opened", self.opened)?;
        out.write_object(
            "last_quote",
            self.last_quote.as_ref().map(|q| q as &dyn Archivable),
        )
    }

    fn read_fields(&mut self, input: &mut dyn ArchiveReader) -> Result<()> {
        self.instrument = input
            .read_object("instrument")?
            .map(AnyInstrument::from_archived)
            .transpose()?;
        self.quantity = input.read_i32("quantity")?;
        self.avg_price = input.read_f64("avg_price")?;
        self.opened = input.read_timestamp("opened")?;
        self.last_quote = input.read_object_as::<Quote>("last_quote")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    pub name: Option<String>,
    pub cash: Option<f64>,
    pub positions: Vec<Position>,
    pub benchmark: Option<AnyInstrument>,
    pub notes: Option<String>,
}

impl Archivable for Portfolio {
    fn type_hierarchy(&self) -> &'static [&'static str] {
        &["Portfolio"]
    }

    fn prototype(&self) -> Box<dyn Archivable> {
        Box::new(Portfolio::default())
    }

    fn write_fields(&self, out: &mut dyn ArchiveWriter) -> Result<()> {
        out.write_string("name", self.name.as_deref())?;
        out.write_f64("cash", self.cash)?;
        let positions: Vec<&dyn Archivable> = self
            .positions
            .iter()
            .map(|p| p as &dyn Archivable)
            .collect();
        out.write_object_list("positions", &positions)?;
        out.write_object(
            "benchmark",
            self.benchmark.as_ref().map(AnyInstrument::as_archivable),
        )?;
        out.write_string("notes", self.notes.as_deref())
    }

    fn read_fields(&mut self, input: &mut dyn ArchiveReader) -> Result<()> {
        self.name = input.read_string("name")?;
        self.cash = input.read_f64("cash")?;
        self.positions = input.read_object_list_as::<Position>("positions")?;
        self.benchmark = input
            .read_object("benchmark")?
            .map(AnyInstrument::from_archived)
            .transpose()?;
        self.notes = input.read_string("notes")?;
        Ok(())
    }
}

// =========================================================================
// Builders and helpers
// =========================================================================

/// Registry with every fixture type.
pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register::<Instrument>().unwrap();
    registry.register::<Equity>().unwrap();
    registry.register::<OptionContract>().unwrap();
    registry.register::<Quote>().unwrap();
    registry.register::<Position>().unwrap();
    registry.register::<Portfolio>().unwrap();
    registry
}

pub fn timestamp(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sample_equity() -> Equity {
    Equity {
        base: Instrument::new("MSFT", "XNAS"),
        lot_size: Some(100),
        listed_on: Some(day(1986, 3, 13)),
    }
}

pub fn sample_option() -> OptionContract {
    OptionContract {
        base: Instrument::new("MSFT240621C00420000", "OPRA"),
        strike: Some(420.0),
        expiry: Some(day(2024, 6, 21)),
        is_call: Some(true),
        multiplier: 100,
        underlying: Some(sample_equity()),
    }
}

pub fn sample_quote() -> Quote {
    Quote {
        bid: Some(415.25),
        ask: Some(415.5),
        bid_size: 300,
        venue_code: 7,
        spread_bps: 0.6,
        at: Some(timestamp(2024, 3, 15, 14, 30, 45)),
        raw: Some(vec![0x01, 0xFE, 0x00, 0x7F]),
    }
}

/// A nested, polymorphic, partially-null portfolio.
pub fn sample_portfolio() -> Portfolio {
    Portfolio {
        name: Some("Momentum <US> & \"friends\"".to_string()),
        cash: Some(25_000.5),
        positions: vec![
            Position {
                instrument: Some(AnyInstrument::Equity(sample_equity())),
                quantity: 200,
                avg_price: Some(402.1),
                opened: Some(timestamp(2024, 1, 2, 9, 30, 0)),
                last_quote: Some(sample_quote()),
            },
            Position {
                instrument: Some(AnyInstrument::Option(sample_option())),
                quantity: -3,
                avg_price: None,
                opened: None,
                last_quote: Some(Quote {
                    bid: None,
                    raw: None,
                    ..sample_quote()
                }),
            },
            Position {
                instrument: Some(AnyInstrument::Base(Instrument {
                    symbol: Some("CASH".to_string()),
                    exchange: None,
                })),
                quantity: 0,
                ..Position::default()
            },
        ],
        benchmark: None,
        notes: None,
    }
}

/// Encode `value` as binary and decode it as `T`.
pub fn binary_roundtrip<T: Archivable>(value: &T, registry: &TypeRegistry) -> T {
    let bytes = binary::to_bytes(Some(value)).unwrap();
    *binary::from_bytes(&bytes, registry)
        .unwrap()
        .expect("root present")
        .downcast::<T>()
        .expect("root type")
}

/// Encode `value` as XML text and decode it as `T`.
pub fn xml_roundtrip<T: Archivable>(value: &T, registry: &TypeRegistry) -> T {
    let text = xml::to_string(Some(value)).unwrap();
    *xml::from_str(&text, registry)
        .unwrap()
        .expect("root present")
        .downcast::<T>()
        .expect("root type")
}
