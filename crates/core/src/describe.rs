//! Text rendering of broker records.
//!
//! Every tool result is a single block of text. Records are flattened into a
//! line of `name: value` pairs wrapped between `<start>` and `<end>` markers,
//! fields listed in declaration order. Holdings are the one exception and use
//! the curated [`holding_line`] template instead.

use crate::models::{Holding, Positions};
use rust_decimal::Decimal;

/// Opening marker of a described record.
pub const RECORD_START: &str = "<start>";
/// Closing marker of a described record.
pub const RECORD_END: &str = "<end>";

/// Renders a single value inside a `name: value` pair.
pub trait Render {
    fn render(&self) -> String;
}

/// A record that can enumerate its fields in declaration order.
pub trait Describable {
    fn fields(&self) -> Vec<(&'static str, String)>;
}

/// Implements [`Describable`] and [`Render`] for a record type by listing its
/// fields in declaration order.
///
/// ```ignore
/// describable!(Ltp { instrument, instrument_token, last_price });
/// ```
#[macro_export]
macro_rules! describable {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::describe::Describable for $ty {
            fn fields(&self) -> Vec<(&'static str, String)> {
                vec![$((stringify!($field), $crate::describe::Render::render(&self.$field))),*]
            }
        }

        impl $crate::describe::Render for $ty {
            fn render(&self) -> String {
                $crate::describe::render_inline(self)
            }
        }
    };
}

macro_rules! render_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Render for $ty {
                fn render(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

render_display!(String, str, bool, i32, i64, u32, u64, f64, Decimal);

impl<T: Render + ?Sized> Render for &T {
    fn render(&self) -> String {
        (**self).render()
    }
}

impl<T: Render> Render for Option<T> {
    fn render(&self) -> String {
        match self {
            Some(value) => value.render(),
            None => "-".to_string(),
        }
    }
}

/// Lists render space-separated inside brackets, as `[a b]`.
impl<T: Render> Render for Vec<T> {
    fn render(&self) -> String {
        let items: Vec<String> = self.iter().map(Render::render).collect();
        format!("[{}]", items.join(" "))
    }
}

/// Renders a nested record as `{name: value, ...}`.
pub fn render_inline<T: Describable + ?Sized>(record: &T) -> String {
    let pairs: Vec<String> = record
        .fields()
        .into_iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

/// Flattens one record into `<start> a: 1, b: x,  <end>`.
///
/// Every pair is followed by `", "` and the closing marker is preceded by a
/// space, so the trailing comma is always present.
pub fn describe<T: Describable + ?Sized>(record: &T) -> String {
    let mut out = String::from(RECORD_START);
    out.push(' ');
    for (name, value) in record.fields() {
        out.push_str(name);
        out.push_str(": ");
        out.push_str(&value);
        out.push_str(", ");
    }
    out.push(' ');
    out.push_str(RECORD_END);
    out
}

/// Describes each record on its own newline-terminated line, in the order given.
pub fn describe_all<T: Describable>(records: &[T]) -> String {
    records.iter().fold(String::new(), |mut out, record| {
        out.push_str(&describe(record));
        out.push('\n');
        out
    })
}

/// The curated holdings view: a fixed subset of fields in a fixed order.
pub fn holding_line(holding: &Holding) -> String {
    let quantity = Decimal::from(holding.quantity);
    let buy_value = holding.average_price * quantity;
    let current_value = holding.last_price * quantity;
    format!(
        "Holding: Tradingsymbol: {}, Exchange: {}, InstrumentToken: {}, ISIN: {}, Product: {}, \
         Price: {:.2}, UsedQuantity: {}, Quantity: {}, T1Quantity: {}, RealisedQuantity: {}, \
         AveragePrice: {:.2}, LastPrice: {:.2}, ClosePrice: {:.2}, PnL: {:.2}, DayChange: {:.2}, \
         DayChangePercentage: {:.2}, BuyValue: {:.2}, CurrentValue: {:.2}",
        holding.tradingsymbol,
        holding.exchange,
        holding.instrument_token,
        holding.isin,
        holding.product,
        holding.price,
        holding.used_quantity,
        holding.quantity,
        holding.t1_quantity,
        holding.realised_quantity,
        holding.average_price,
        holding.last_price,
        holding.close_price,
        holding.pnl,
        holding.day_change,
        holding.day_change_percentage,
        buy_value,
        current_value,
    )
}

/// One newline-terminated [`holding_line`] per holding.
pub fn holdings_text(holdings: &[Holding]) -> String {
    holdings.iter().fold(String::new(), |mut out, holding| {
        out.push_str(&holding_line(holding));
        out.push('\n');
        out
    })
}

/// Day positions followed by net positions, each section described record by record.
pub fn positions_text(positions: &Positions) -> String {
    format!(
        "DAY POSITIONS --- {} \n \n NET POSITIONS --- {}",
        describe_all(&positions.day),
        describe_all(&positions.net)
    )
}
