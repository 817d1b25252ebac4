//! SQL-style query construction for the resource query endpoint.
//!
//! The upstream exposes one read surface: `GET {companyBase}/query?query=select * from
//! {entity} ...` where the query value keeps literal, non-percent-escaped spaces. That
//! partially-unescaped encoding is a hard protocol requirement, so everything here
//! renders plain strings and never round-trips through a [`url::Url`].
//!
//! One generic [`QueryBuilder`] serves every entity kind; entity-specific convenience
//! predicates are free functions over it (see [`updated_after`] and friends) rather
//! than per-entity subtypes.

pub mod probe;

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::_prelude::*;

/// Fixed enumeration of queryable resource kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
	/// Ledger accounts.
	Account,
	/// Vendor bills.
	Bill,
	/// Customers.
	Customer,
	/// Estimates.
	Estimate,
	/// Customer invoices.
	Invoice,
	/// Products and services.
	Item,
	/// Received payments.
	Payment,
	/// Vendors.
	Vendor,
}
impl Entity {
	/// Returns the lowercase keyword at the head of a rendered query.
	pub const fn keyword(self) -> &'static str {
		match self {
			Entity::Account => "account",
			Entity::Bill => "bill",
			Entity::Customer => "customer",
			Entity::Estimate => "estimate",
			Entity::Invoice => "invoice",
			Entity::Item => "item",
			Entity::Payment => "payment",
			Entity::Vendor => "vendor",
		}
	}
}
impl Display for Entity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.keyword())
	}
}

/// Sort direction for the `orderby` option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
	/// Ascending order.
	Ascending,
	/// Descending order.
	Descending,
}
impl SortDirection {
	/// Returns the keyword rendered into the query.
	pub const fn as_str(self) -> &'static str {
		match self {
			SortDirection::Ascending => "asc",
			SortDirection::Descending => "desc",
		}
	}
}

/// Field and direction for the `orderby` option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
	/// Entity field to sort on.
	pub field: String,
	/// Sort direction.
	pub direction: SortDirection,
}

/// Paging and sort options rendered after the predicate clause.
///
/// Out-of-range values are corrected silently at the setter boundary, never rejected:
/// `maxresults` is clamped into `[1, 1000]` and `startposition` is floored at 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOptions {
	start_position: Option<i64>,
	max_results: Option<i64>,
	minor_version: Option<u32>,
	order_by: Option<OrderBy>,
	auto_paginate: bool,
}
impl SearchOptions {
	/// Largest page the upstream will serve.
	pub const MAX_RESULTS_CEILING: i64 = 1_000;

	/// Creates an empty option set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the one-based window start, floored at 0.
	pub fn with_start_position(mut self, position: i64) -> Self {
		self.start_position = Some(position.max(0));

		self
	}

	/// Sets the page size, clamped into `[1, 1000]`.
	pub fn with_max_results(mut self, count: i64) -> Self {
		self.max_results = Some(count.clamp(1, Self::MAX_RESULTS_CEILING));

		self
	}

	/// Sets the API minor version controlling which optional response fields appear.
	pub fn with_minor_version(mut self, version: u32) -> Self {
		self.minor_version = Some(version);

		self
	}

	/// Sets the sort field and direction.
	pub fn with_order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
		self.order_by = Some(OrderBy { field: field.into(), direction });

		self
	}

	/// Opts into automatic pagination checks by [`probe::PaginationProbe`].
	pub fn with_auto_paginate(mut self, enabled: bool) -> Self {
		self.auto_paginate = enabled;

		self
	}

	/// Window start, if set (post-floor).
	pub fn start_position(&self) -> Option<i64> {
		self.start_position
	}

	/// Page size, if set (post-clamp).
	pub fn max_results(&self) -> Option<i64> {
		self.max_results
	}

	/// Minor version, if set.
	pub fn minor_version(&self) -> Option<u32> {
		self.minor_version
	}

	/// Sort option, if set.
	pub fn order_by(&self) -> Option<&OrderBy> {
		self.order_by.as_ref()
	}

	/// Whether the caller opted into automatic pagination checks.
	pub fn auto_paginate(&self) -> bool {
		self.auto_paginate
	}

	/// Renders the options as `(keyword, value)` pairs in their fixed protocol order.
	fn render_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = Vec::new();

		if let Some(order_by) = &self.order_by {
			pairs.push(("orderby", format!("{} {}", order_by.field, order_by.direction.as_str())));
		}
		if let Some(position) = self.start_position {
			pairs.push(("startposition", position.to_string()));
		}
		if let Some(count) = self.max_results {
			pairs.push(("maxresults", count.to_string()));
		}
		if let Some(version) = self.minor_version {
			pairs.push(("minorversion", version.to_string()));
		}

		pairs
	}
}

/// Accumulates filter predicates and options for one entity kind, then renders the
/// request path.
///
/// Predicates are appended in insertion order with no deduplication; duplicates are
/// legal and evaluated conjunctively. Field names and values are interpolated into
/// predicate text verbatim, so callers must not pass untrusted input as either.
#[derive(Clone, Debug)]
pub struct QueryBuilder {
	entity: Entity,
	clauses: Vec<String>,
	options: SearchOptions,
}
impl QueryBuilder {
	/// Creates a builder for the provided entity kind.
	pub fn new(entity: Entity) -> Self {
		Self { entity, clauses: Vec::new(), options: SearchOptions::default() }
	}

	/// Appends an equality predicate; the value is rendered in single quotes.
	pub fn where_equals(mut self, field: &str, value: &str) -> Self {
		self.clauses.push(format!("{field} = '{value}'"));

		self
	}

	/// Appends a strictly-after predicate over an instant field.
	pub fn where_after(mut self, field: &str, instant: OffsetDateTime) -> Self {
		self.clauses.push(format!("{field} > '{}'", render_instant(instant)));

		self
	}

	/// Appends a strictly-before predicate over an instant field.
	pub fn where_before(mut self, field: &str, instant: OffsetDateTime) -> Self {
		self.clauses.push(format!("{field} < '{}'", render_instant(instant)));

		self
	}

	/// Replaces the paging and sort options.
	pub fn search_options(mut self, options: SearchOptions) -> Self {
		self.options = options;

		self
	}

	/// Entity kind this builder targets.
	pub fn entity(&self) -> Entity {
		self.entity
	}

	/// Current paging and sort options.
	pub fn options(&self) -> &SearchOptions {
		&self.options
	}

	/// Renders the query clause: `select * from {entity}` plus predicates and options.
	pub fn render(&self) -> String {
		let mut query = format!("select * from {}", self.entity.keyword());

		if !self.clauses.is_empty() {
			query.push_str(" where ");
			query.push_str(&self.clauses.join(" and "));
		}

		for (keyword, value) in self.options.render_pairs() {
			query.push(' ');
			query.push_str(keyword);
			query.push(' ');
			query.push_str(&value);
		}

		query
	}

	/// Renders the full request path under a company base endpoint.
	///
	/// Spaces in the query value stay literal; the upstream requires this exact
	/// partially-unescaped encoding byte-for-byte.
	pub fn build(&self, company_base: &str) -> String {
		format!("{company_base}/query?query={}", self.render())
	}
}

/// Restricts results to records updated strictly after the provided instant.
pub fn updated_after(builder: QueryBuilder, instant: OffsetDateTime) -> QueryBuilder {
	builder.where_after("MetaData.LastUpdatedTime", instant)
}

/// Restricts results to records updated strictly before the provided instant.
pub fn updated_before(builder: QueryBuilder, instant: OffsetDateTime) -> QueryBuilder {
	builder.where_before("MetaData.LastUpdatedTime", instant)
}

/// Filters documents by their `DocNumber` field.
pub fn doc_number_equals(builder: QueryBuilder, number: &str) -> QueryBuilder {
	builder.where_equals("DocNumber", number)
}

/// Filters sales documents by their customer reference.
pub fn customer_ref_equals(builder: QueryBuilder, customer_id: &str) -> QueryBuilder {
	builder.where_equals("CustomerRef", customer_id)
}

fn render_instant(instant: OffsetDateTime) -> String {
	instant.format(&Rfc3339).unwrap_or_else(|_| instant.to_string())
}
