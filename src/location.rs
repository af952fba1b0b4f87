use std::fmt;

use serde::Serialize;

/// Geographic and climatic grouping of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Region {
    Norte,
    Centro,
    Sur,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Norte, Region::Centro, Region::Sur];

    pub fn name(self) -> &'static str {
        match self {
            Region::Norte => "Norte",
            Region::Centro => "Centro",
            Region::Sur => "Sur",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A state with the coordinates of its reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: &'static str,
    /// Latitude in degrees, range -90 to 90.
    pub latitude: f64,
    /// Longitude in degrees, range -180 to 180.
    pub longitude: f64,
    pub region: Region,
}

const fn state(name: &'static str, latitude: f64, longitude: f64, region: Region) -> Location {
    Location {
        name,
        latitude,
        longitude,
        region,
    }
}

/// The 32 federal entities of Mexico, alphabetically.
pub static MEXICAN_STATES: [Location; 32] = [
    state("Aguascalientes", 21.8818, -102.2916, Region::Centro),
    state("Baja California", 30.8406, -115.2838, Region::Norte),
    state("Baja California Sur", 26.0444, -111.6661, Region::Norte),
    state("Campeche", 19.8301, -90.5349, Region::Sur),
    state("Chiapas", 16.7569, -93.1292, Region::Sur),
    state("Chihuahua", 28.6353, -106.0889, Region::Norte),
    state("Ciudad de México", 19.4326, -99.1332, Region::Centro),
    state("Coahuila", 27.0587, -101.7068, Region::Norte),
    state("Colima", 19.2452, -103.7241, Region::Centro),
    state("Durango", 24.0277, -104.6532, Region::Norte),
    state("Estado de México", 19.4969, -99.7233, Region::Centro),
    state("Guanajuato", 20.9170, -101.1617, Region::Centro),
    state("Guerrero", 17.4392, -99.5451, Region::Sur),
    state("Hidalgo", 20.0911, -98.7624, Region::Centro),
    state("Jalisco", 20.6595, -103.3494, Region::Centro),
    state("Michoacán", 19.5665, -101.7068, Region::Centro),
    state("Morelos", 18.6813, -99.1013, Region::Centro),
    state("Nayarit", 21.7514, -104.8455, Region::Centro),
    state("Nuevo León", 25.5922, -99.9962, Region::Norte),
    state("Oaxaca", 17.0732, -96.7266, Region::Sur),
    state("Puebla", 19.0414, -98.2063, Region::Centro),
    state("Querétaro", 20.5888, -100.3899, Region::Centro),
    state("Quintana Roo", 19.1817, -88.4791, Region::Sur),
    state("San Luis Potosí", 22.1565, -100.9855, Region::Centro),
    state("Sinaloa", 25.1721, -107.4795, Region::Norte),
    state("Sonora", 29.2970, -110.3309, Region::Norte),
    state("Tabasco", 17.8409, -92.6189, Region::Sur),
    state("Tamaulipas", 24.2669, -98.8363, Region::Norte),
    state("Tlaxcala", 19.3139, -98.2404, Region::Centro),
    state("Veracruz", 19.1738, -96.1342, Region::Sur),
    state("Yucatán", 20.7099, -89.0943, Region::Sur),
    state("Zacatecas", 22.7709, -102.5832, Region::Centro),
];

/// Return the states in `region`, or all of them for `None`, in table order.
pub fn states_in(region: Option<Region>) -> Vec<Location> {
    MEXICAN_STATES
        .iter()
        .filter(|loc| region.is_none_or(|r| loc.region == r))
        .cloned()
        .collect()
}

/// Lowercase and strip Spanish diacritics so "michoacan" finds "Michoacán".
fn fold(s: &str) -> String {
    s.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            c => c,
        })
        .collect()
}

/// Compare two state names, ignoring case and accents.
pub fn same_name(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

/// Find a state by name, ignoring case and accents.
pub fn find_state<'a>(locations: &'a [Location], name: &str) -> Option<&'a Location> {
    locations.iter().find(|loc| same_name(loc.name, name))
}
