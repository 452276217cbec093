use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cloudkitchen_core::{DomainError, DomainResult, Entity, LineItemId};

use crate::format;

/// Catering package tier. Each tier carries a default unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    #[default]
    Economy,
    Standard,
    Premium,
}

impl PackageType {
    pub const ALL: [PackageType; 3] = [
        PackageType::Economy,
        PackageType::Standard,
        PackageType::Premium,
    ];

    /// Unit price (BDT) bound to the tier.
    pub fn default_price(self) -> u64 {
        match self {
            PackageType::Economy => 150,
            PackageType::Standard => 250,
            PackageType::Premium => 400,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PackageType::Economy => "economy",
            PackageType::Standard => "standard",
            PackageType::Premium => "premium",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PackageType::Economy => "Economy",
            PackageType::Standard => "Standard",
            PackageType::Premium => "Premium",
        }
    }
}

impl core::fmt::Display for PackageType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for PackageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        PackageType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown package type: {s:?}")))
    }
}

/// Coerce raw form input into a non-negative count.
///
/// Leading whitespace and an optional `+` are skipped, then the leading run of
/// decimal digits is taken. Anything else (including negatives) yields 0.
/// Values beyond `u64::MAX` saturate.
pub fn coerce_count(raw: &str) -> u64 {
    let s = raw.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    s.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        })
}

/// Pricing block shared by every kind of line item.
///
/// Fields are private so that `line_total == persons * unit_price` holds after
/// every edit: each setter recomputes the total before returning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PricingRecord")]
pub struct Pricing {
    package_type: PackageType,
    persons: u64,
    unit_price: u64,
    line_total: u64,
}

/// Stored shape of a pricing block; the line total is recomputed on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingRecord {
    #[serde(default)]
    package_type: PackageType,
    #[serde(default)]
    persons: u64,
    #[serde(default)]
    unit_price: u64,
}

impl From<PricingRecord> for Pricing {
    fn from(r: PricingRecord) -> Self {
        Pricing::new(r.package_type, r.persons, r.unit_price)
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Pricing::for_package(PackageType::Economy)
    }
}

impl Pricing {
    pub fn new(package_type: PackageType, persons: u64, unit_price: u64) -> Self {
        let mut p = Self {
            package_type,
            persons,
            unit_price,
            line_total: 0,
        };
        p.recompute();
        p
    }

    /// Zero persons at the tier's default price.
    pub fn for_package(package_type: PackageType) -> Self {
        Self::new(package_type, 0, package_type.default_price())
    }

    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    pub fn persons(&self) -> u64 {
        self.persons
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn line_total(&self) -> u64 {
        self.line_total
    }

    pub fn set_persons(&mut self, persons: u64) {
        self.persons = persons;
        self.recompute();
    }

    pub fn set_unit_price(&mut self, unit_price: u64) {
        self.unit_price = unit_price;
        self.recompute();
    }

    /// Switch tier and reset the unit price to the tier's default.
    pub fn set_package_type(&mut self, package_type: PackageType) {
        self.package_type = package_type;
        self.unit_price = package_type.default_price();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.line_total = self.persons.saturating_mul(self.unit_price);
    }
}

/// Editable line-item fields, as named by the bill form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    ServiceDate,
    PackageName,
    FoodItems,
    PackageType,
    Persons,
    UnitPrice,
}

/// Behaviour shared by corporate service lines and event packages.
pub trait LineItem: Entity<Id = LineItemId> + Clone + core::fmt::Debug {
    /// Heading of the invoice item table for this kind of line.
    const TABLE_TITLE: &'static str;

    /// The two kind-specific invoice columns.
    const DETAIL_COLUMNS: [&'static str; 2];

    /// Fresh line: zero persons, economy tier at its default price.
    fn create(id: LineItemId) -> Self;

    fn pricing(&self) -> &Pricing;

    fn pricing_mut(&mut self) -> &mut Pricing;

    /// Set one of the kind-specific text fields.
    fn set_detail(&mut self, field: ItemField, raw: &str) -> DomainResult<()>;

    /// Display values for `DETAIL_COLUMNS`.
    fn detail_cells(&self) -> [String; 2];

    fn persons(&self) -> u64 {
        self.pricing().persons()
    }

    fn unit_price(&self) -> u64 {
        self.pricing().unit_price()
    }

    fn line_total(&self) -> u64 {
        self.pricing().line_total()
    }

    /// Apply a raw form edit. Numeric fields are coerced, never rejected.
    fn set_field(&mut self, field: ItemField, raw: &str) -> DomainResult<()> {
        match field {
            ItemField::Persons => self.pricing_mut().set_persons(coerce_count(raw)),
            ItemField::UnitPrice => self.pricing_mut().set_unit_price(coerce_count(raw)),
            ItemField::PackageType => {
                let package_type = raw.parse::<PackageType>()?;
                self.pricing_mut().set_package_type(package_type);
            }
            _ => return self.set_detail(field, raw),
        }
        Ok(())
    }
}

/// Corporate bill row: one service date at one package tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateLine {
    pub id: LineItemId,
    #[serde(default, with = "format::optional_date")]
    pub service_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub pricing: Pricing,
}

impl Entity for CorporateLine {
    type Id = LineItemId;

    fn id(&self) -> &LineItemId {
        &self.id
    }
}

impl LineItem for CorporateLine {
    const TABLE_TITLE: &'static str = "Service Details";
    const DETAIL_COLUMNS: [&'static str; 2] = ["Service Date", "Package Type"];

    fn create(id: LineItemId) -> Self {
        Self {
            id,
            service_date: None,
            pricing: Pricing::default(),
        }
    }

    fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    fn pricing_mut(&mut self) -> &mut Pricing {
        &mut self.pricing
    }

    fn set_detail(&mut self, field: ItemField, raw: &str) -> DomainResult<()> {
        match field {
            ItemField::ServiceDate => {
                self.service_date = format::parse_optional_date(raw)?;
                Ok(())
            }
            other => Err(DomainError::validation(format!(
                "{other:?} is not a corporate line field"
            ))),
        }
    }

    fn detail_cells(&self) -> [String; 2] {
        [
            format::day_month_year(self.service_date),
            self.pricing.package_type().label().to_string(),
        ]
    }
}

/// Event bill row: a named package with its menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPackage {
    pub id: LineItemId,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub food_items: String,
    #[serde(flatten)]
    pub pricing: Pricing,
}

impl Entity for EventPackage {
    type Id = LineItemId;

    fn id(&self) -> &LineItemId {
        &self.id
    }
}

impl LineItem for EventPackage {
    const TABLE_TITLE: &'static str = "Package Details";
    const DETAIL_COLUMNS: [&'static str; 2] = ["Package Name", "Food Items"];

    fn create(id: LineItemId) -> Self {
        Self {
            id,
            package_name: String::new(),
            food_items: String::new(),
            pricing: Pricing::default(),
        }
    }

    fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    fn pricing_mut(&mut self) -> &mut Pricing {
        &mut self.pricing
    }

    fn set_detail(&mut self, field: ItemField, raw: &str) -> DomainResult<()> {
        match field {
            ItemField::PackageName => self.package_name = raw.to_string(),
            ItemField::FoodItems => self.food_items = raw.to_string(),
            other => {
                return Err(DomainError::validation(format!(
                    "{other:?} is not an event package field"
                )));
            }
        }
        Ok(())
    }

    fn detail_cells(&self) -> [String; 2] {
        [self.package_name.clone(), self.food_items.clone()]
    }
}

/// Ordered line items of one bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItems<T>(Vec<T>);

impl<T> Default for LineItems<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> From<Vec<T>> for LineItems<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T: LineItem> LineItems<T> {
    /// Collection holding a single fresh line, as a new bill form starts.
    pub fn with_first() -> Self {
        Self(vec![T::create(LineItemId::FIRST)])
    }

    /// Max existing id + 1, or 1 when empty.
    pub fn next_id(&self) -> LineItemId {
        self.0
            .iter()
            .map(|item| *item.id())
            .max()
            .map_or(LineItemId::FIRST, LineItemId::next)
    }

    /// Append a fresh line and return it for editing.
    pub fn push_new(&mut self) -> &mut T {
        let id = self.next_id();
        let idx = self.0.len();
        self.0.push(T::create(id));
        &mut self.0[idx]
    }

    pub fn get_mut(&mut self, index: usize) -> DomainResult<&mut T> {
        let len = self.0.len();
        self.0
            .get_mut(index)
            .ok_or_else(|| DomainError::not_found(format!("line item #{index} (of {len})")))
    }

    /// Apply a raw form edit to the line at `index`.
    pub fn edit(&mut self, index: usize, field: ItemField, raw: &str) -> DomainResult<()> {
        self.get_mut(index)?.set_field(field, raw)
    }

    /// Remove the line at `index`. A bill keeps at least one line.
    pub fn remove(&mut self, index: usize) -> DomainResult<T> {
        if index >= self.0.len() {
            return Err(DomainError::not_found(format!(
                "line item #{index} (of {})",
                self.0.len()
            )));
        }
        if self.0.len() == 1 {
            return Err(DomainError::validation(
                "a bill must keep at least one line item",
            ));
        }
        Ok(self.0.remove(index))
    }
}

impl<T> LineItems<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<'a, T> IntoIterator for &'a LineItems<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
