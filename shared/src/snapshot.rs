//! Per-run input snapshot
//!
//! All tables are read once, converted into typed records here and indexed
//! by SKU. The snapshot is passed explicitly into the engine; nothing is
//! cached between runs.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SnapshotError;
use crate::models::{OfferRecord, PurchaseOrder, Rank, SalesRecord, SkuMeta, StockOverlay};
use crate::types::SkuId;
use crate::validation::{
    coerce_bool, coerce_date, coerce_lot_size, coerce_price, coerce_quantity, coerce_text,
    normalize_sku_id,
};

pub const SALES_TABLE: &str = "sales";
pub const OFFERS_TABLE: &str = "offers";
pub const PRODUCTS_TABLE: &str = "products";
pub const PURCHASE_ORDERS_TABLE: &str = "purchase_orders";

/// A logical column and the header names it may appear under
#[derive(Debug, Clone, Copy)]
struct Column {
    name: &'static str,
    aliases: &'static [&'static str],
}

impl Column {
    const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    /// First present cell under any of the column's names
    fn get<'r>(&self, row: &'r Map<String, Value>) -> Option<&'r Value> {
        self.names().find_map(|name| row.get(name))
    }

    fn value<'r>(&self, row: &'r Map<String, Value>) -> &'r Value {
        self.get(row).unwrap_or(&Value::Null)
    }
}

const SKU_ID: Column = Column::new("sku_id", &["jan", "sku"]);

const UNITS_SOLD: Column = Column::new("units_sold", &["units_sold_period", "quantity_sold"]);
const STOCK_ON_HAND: Column = Column::new("stock_on_hand", &["stock"]);
const STOCK_AVAILABLE: Column = Column::new("stock_available", &[]);
const STOCK_ON_ORDER: Column = Column::new("stock_on_order", &["on_order"]);

const SUPPLIER_NAME: Column = Column::new("supplier_name", &["supplier", "maker"]);
const ORDER_LOT_SIZE: Column = Column::new("order_lot_size", &["order_lot", "lot"]);
const UNIT_PRICE: Column = Column::new("unit_price", &["price"]);

const DISPLAY_NAME: Column = Column::new("display_name", &["name"]);
const RANK: Column = Column::new("rank", &[]);
const DISCONTINUED: Column = Column::new("discontinued", &[]);

const QUANTITY: Column = Column::new("quantity", &[]);
const CHANNEL: Column = Column::new("channel", &[]);
const ORDERED_ON: Column = Column::new("ordered_on", &[]);

const OVERLAY_QUANTITY: Column = Column::new("quantity", &["stock"]);

/// Raw rows for every table a run reads, as fetched from the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotTables {
    pub sales: Vec<Value>,
    pub offers: Vec<Value>,
    pub products: Vec<Value>,
    #[serde(default)]
    pub purchase_orders: Vec<Value>,
    /// Display-only stock tables keyed by label
    #[serde(default)]
    pub overlays: BTreeMap<String, Vec<Value>>,
}

/// Row accounting for one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    pub rows: usize,
    /// Rows skipped because their SKU could not be identified
    pub rejected: usize,
}

/// Typed, validated input for one replenishment run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sales: Vec<SalesRecord>,
    pub offers: Vec<OfferRecord>,
    pub products: Vec<SkuMeta>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub overlays: Vec<StockOverlay>,
    pub table_counts: Vec<TableCount>,
}

impl Snapshot {
    pub fn new(sales: Vec<SalesRecord>, offers: Vec<OfferRecord>, products: Vec<SkuMeta>) -> Self {
        Self {
            sales,
            offers,
            products,
            ..Self::default()
        }
    }

    pub fn with_purchase_orders(mut self, purchase_orders: Vec<PurchaseOrder>) -> Self {
        self.purchase_orders = purchase_orders;
        self
    }

    pub fn with_overlays(mut self, overlays: Vec<StockOverlay>) -> Self {
        self.overlays = overlays;
        self
    }

    /// Convert raw rows into typed records.
    ///
    /// Fails only when a non-empty table lacks a required column or holds a
    /// row that is not an object. Bad cell values are coerced.
    pub fn from_tables(tables: &SnapshotTables) -> Result<Self, SnapshotError> {
        let mut table_counts = Vec::new();

        let sales_rows = rows(SALES_TABLE, &tables.sales, &[SKU_ID, UNITS_SOLD])?;
        let sales = collect(SALES_TABLE, &sales_rows, &mut table_counts, parse_sales);

        let offer_rows = rows(
            OFFERS_TABLE,
            &tables.offers,
            &[SKU_ID, SUPPLIER_NAME, ORDER_LOT_SIZE, UNIT_PRICE],
        )?;
        let offers = collect(OFFERS_TABLE, &offer_rows, &mut table_counts, parse_offer);

        let product_rows = rows(PRODUCTS_TABLE, &tables.products, &[SKU_ID, DISPLAY_NAME])?;
        let products = collect(PRODUCTS_TABLE, &product_rows, &mut table_counts, parse_product);

        let order_rows = rows(
            PURCHASE_ORDERS_TABLE,
            &tables.purchase_orders,
            &[SKU_ID, QUANTITY],
        )?;
        let purchase_orders = collect(
            PURCHASE_ORDERS_TABLE,
            &order_rows,
            &mut table_counts,
            parse_purchase_order,
        );

        let mut overlays = Vec::new();
        for (label, raw) in &tables.overlays {
            let table = format!("overlay:{}", label);
            let overlay_rows = rows(&table, raw, &[SKU_ID, OVERLAY_QUANTITY])?;
            overlays.extend(collect(&table, &overlay_rows, &mut table_counts, |row| {
                Some(StockOverlay {
                    label: label.clone(),
                    sku_id: normalize_sku_id(SKU_ID.value(row))?,
                    quantity: coerce_quantity(OVERLAY_QUANTITY.value(row)),
                })
            }));
        }

        let snapshot = Self {
            sales,
            offers,
            products,
            purchase_orders,
            overlays,
            table_counts,
        };
        for count in snapshot.table_counts.iter().filter(|c| c.rejected > 0) {
            tracing::warn!(
                table = %count.table,
                rejected = count.rejected,
                "rows without a usable sku_id were skipped"
            );
        }
        Ok(snapshot)
    }

    /// Build the per-SKU lookups for a run
    pub fn index(&self) -> SnapshotIndex<'_> {
        SnapshotIndex::new(self)
    }
}

/// Check structure and borrow each row as an object
fn rows<'t>(
    table: &str,
    raw: &'t [Value],
    required: &[Column],
) -> Result<Vec<&'t Map<String, Value>>, SnapshotError> {
    let objects = raw
        .iter()
        .enumerate()
        .map(|(row, value)| {
            value.as_object().ok_or_else(|| SnapshotError::MalformedRow {
                table: table.to_string(),
                row,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if objects.is_empty() {
        return Ok(objects);
    }

    let missing: Vec<String> = required
        .iter()
        .filter(|column| !objects.iter().any(|row| column.get(row).is_some()))
        .map(|column| column.name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SnapshotError::MissingColumns {
            table: table.to_string(),
            columns: missing,
        });
    }

    Ok(objects)
}

fn collect<T>(
    table: &str,
    rows: &[&Map<String, Value>],
    counts: &mut Vec<TableCount>,
    parse: impl Fn(&Map<String, Value>) -> Option<T>,
) -> Vec<T> {
    let records: Vec<T> = rows.iter().filter_map(|row| parse(row)).collect();
    counts.push(TableCount {
        table: table.to_string(),
        rows: rows.len(),
        rejected: rows.len() - records.len(),
    });
    records
}

fn parse_sales(row: &Map<String, Value>) -> Option<SalesRecord> {
    let stock_on_hand = coerce_quantity(STOCK_ON_HAND.value(row));
    let stock_available = STOCK_AVAILABLE
        .get(row)
        .map(coerce_quantity)
        .unwrap_or(stock_on_hand);
    Some(SalesRecord {
        sku_id: normalize_sku_id(SKU_ID.value(row))?,
        units_sold_period: coerce_quantity(UNITS_SOLD.value(row)),
        stock_on_hand,
        stock_available,
        stock_on_order: coerce_quantity(STOCK_ON_ORDER.value(row)),
    })
}

fn parse_offer(row: &Map<String, Value>) -> Option<OfferRecord> {
    Some(OfferRecord {
        sku_id: normalize_sku_id(SKU_ID.value(row))?,
        supplier_name: coerce_text(SUPPLIER_NAME.value(row))?,
        order_lot_size: coerce_lot_size(ORDER_LOT_SIZE.value(row))
            .and_then(|lot| i64::try_from(lot).ok())
            .unwrap_or(0),
        unit_price: coerce_price(UNIT_PRICE.value(row)),
    })
}

fn parse_product(row: &Map<String, Value>) -> Option<SkuMeta> {
    let rank_label = coerce_text(RANK.value(row));
    Some(SkuMeta {
        sku_id: normalize_sku_id(SKU_ID.value(row))?,
        display_name: coerce_text(DISPLAY_NAME.value(row)).unwrap_or_default(),
        rank: Rank::normalize(rank_label.as_deref()),
        discontinued: coerce_bool(DISCONTINUED.value(row)),
    })
}

fn parse_purchase_order(row: &Map<String, Value>) -> Option<PurchaseOrder> {
    Some(PurchaseOrder {
        sku_id: normalize_sku_id(SKU_ID.value(row))?,
        quantity: coerce_quantity(QUANTITY.value(row)),
        channel: coerce_text(CHANNEL.value(row)),
        ordered_on: coerce_date(ORDERED_ON.value(row)),
    })
}

/// Per-SKU lookups over a snapshot
#[derive(Debug)]
pub struct SnapshotIndex<'a> {
    offers: HashMap<&'a SkuId, Vec<&'a OfferRecord>>,
    products: HashMap<&'a SkuId, &'a SkuMeta>,
    purchase_orders: HashMap<&'a SkuId, Vec<&'a PurchaseOrder>>,
    overlays: HashMap<&'a SkuId, Vec<&'a StockOverlay>>,
}

impl<'a> SnapshotIndex<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        let mut offers: HashMap<&SkuId, Vec<&OfferRecord>> = HashMap::new();
        for offer in &snapshot.offers {
            offers.entry(&offer.sku_id).or_default().push(offer);
        }

        // First product row wins for duplicated SKUs
        let mut products: HashMap<&SkuId, &SkuMeta> = HashMap::new();
        for product in &snapshot.products {
            products.entry(&product.sku_id).or_insert(product);
        }

        let mut purchase_orders: HashMap<&SkuId, Vec<&PurchaseOrder>> = HashMap::new();
        for order in &snapshot.purchase_orders {
            purchase_orders.entry(&order.sku_id).or_default().push(order);
        }

        let mut overlays: HashMap<&SkuId, Vec<&StockOverlay>> = HashMap::new();
        for overlay in &snapshot.overlays {
            overlays.entry(&overlay.sku_id).or_default().push(overlay);
        }

        Self {
            offers,
            products,
            purchase_orders,
            overlays,
        }
    }

    pub fn offers_for(&self, sku_id: &SkuId) -> &[&'a OfferRecord] {
        self.offers.get(sku_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn meta_for(&self, sku_id: &SkuId) -> Option<&'a SkuMeta> {
        self.products.get(sku_id).copied()
    }

    pub fn orders_for(&self, sku_id: &SkuId) -> &[&'a PurchaseOrder] {
        self.purchase_orders
            .get(sku_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Overlay figures for a SKU, summed per label
    pub fn overlays_for(&self, sku_id: &SkuId) -> BTreeMap<String, u64> {
        let mut figures = BTreeMap::new();
        for overlay in self.overlays.get(sku_id).into_iter().flatten() {
            let total: &mut u64 = figures.entry(overlay.label.clone()).or_default();
            *total = total.saturating_add(overlay.quantity);
        }
        figures
    }
}
