// One listing panel, as lifted off the page.
//
// panel (div.panel-primary | div.property-panel | div[data-type=property] | div.property-listing)
//  ├── div.house-image              <- marks a real listing panel
//  ├── h4.panel-title > a           -> address
//  ├── div.panel-body
//  │    ├── code                    -> price
//  │    └── p  "Sold ... on <date>" -> sold date
//  ├── p.features
//  │    ├── span.label-info         -> property type
//  │    └── span > i.bedrooms | i.bathrooms | i.car_spaces
//  └── div.house-desc > div "Land Size: ..."

/// Extraction-time record. Values are still the raw page text; a field the
/// page did not carry is `None` rather than a placeholder string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSale {
    pub locality: String,
    pub address: String,
    pub price: Option<String>,
    pub sold_date: Option<String>,
    pub property_type: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub parking: Option<String>,
    pub land_size: Option<String>,
}

impl RawSale {
    /// True when no data field carries anything. The locality is context, not data.
    pub fn is_blank(&self) -> bool {
        self.address.trim().is_empty()
            && self.price.is_none()
            && self.sold_date.is_none()
            && self.property_type.is_none()
            && self.bedrooms.is_none()
            && self.bathrooms.is_none()
            && self.parking.is_none()
            && self.land_size.is_none()
    }
}
