//! City database lookup.

use std::net::IpAddr;

use maxminddb::Reader;

use crate::error_handling::GeoError;
use crate::models::GeoLocation;

/// Looks `ip` up in a GeoLite2-City reader.
///
/// Returns `Ok(None)` when the database holds no record, or a record without
/// country or coordinates.
pub fn lookup_city(reader: &Reader<Vec<u8>>, ip: IpAddr) -> Result<Option<GeoLocation>, GeoError> {
    let lookup_error = |reason: String| GeoError::Lookup {
        ip: ip.to_string(),
        reason,
    };

    // maxminddb 0.27: lookup() yields a LookupResult; decode() is Ok(None) without data
    let result = reader.lookup(ip).map_err(|e| lookup_error(e.to_string()))?;
    if !result.has_data() {
        return Ok(None);
    }
    let city: maxminddb::geoip2::City = match result.decode() {
        Ok(Some(city)) => city,
        Ok(None) => return Ok(None),
        Err(e) => return Err(lookup_error(e.to_string())),
    };

    let (Some(latitude), Some(longitude)) = (city.location.latitude, city.location.longitude)
    else {
        return Ok(None);
    };
    let Some(country_code) = city.country.iso_code.map(str::to_string) else {
        return Ok(None);
    };

    Ok(Some(GeoLocation {
        ip_address: ip.to_string(),
        country_code,
        country_name: city
            .country
            .names
            .english
            .map(str::to_string)
            .unwrap_or_default(),
        region: city
            .subdivisions
            .first()
            .and_then(|s| s.names.english)
            .map(str::to_string),
        city: city.city.names.english.map(str::to_string),
        latitude,
        longitude,
    }))
}
