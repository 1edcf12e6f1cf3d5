use crate::constants::{DATE_FORMAT, SRID};
use crate::models::SearchFilter;
use chrono::NaiveDate;

/// Builds the OData `$filter` expression for a search.
///
/// The expression combines four predicates joined with `and`:
/// collection name equality, spatial intersection with the area of interest,
/// substring match on the product name, and a half-open interval on the
/// acquisition start (`ge start`, `lt end`, both at midnight UTC).
pub fn odata_filter(filter: &SearchFilter) -> String {
    let dates = filter.dates();
    format!(
        "Collection/Name eq '{collection}' and \
         OData.CSC.Intersects(area=geography'SRID={SRID};{wkt}') and \
         contains(Name,'{name}') and \
         ContentDate/Start ge {start} and \
         ContentDate/Start lt {end}",
        collection = escape_literal(filter.collection()),
        wkt = filter.area().to_wkt(),
        name = escape_literal(filter.name_contains()),
        start = odata_timestamp(dates.start()),
        end = odata_timestamp(dates.end()),
    )
}

/// OData string literals escape a single quote by doubling it.
fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn odata_timestamp(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format(DATE_FORMAT))
}
