//! Effects - side effects declared by the reducer

/// Side effects that can be triggered by actions
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch one page of cities for the list mounted as `mount`
    FetchCities { mount: u64, page: u32 },
    /// Fetch current weather for `city` on the screen mounted as `mount`
    FetchWeather { mount: u64, city: String },
}
