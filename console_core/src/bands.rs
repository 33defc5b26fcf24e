use console_runtime::SiteState;

/// Band names from `known` that carry a non-zero reading at `site`, in the
/// order `known` yields them.
pub fn visible_bands<'a, I>(site: &SiteState, known: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    known
        .into_iter()
        .filter(|name| site.band_reading(name).is_some_and(|value| value != 0.0))
        .collect()
}

/// True when at least one catalog band has something to report at `site`.
pub fn has_band_readings<'a, I>(site: &SiteState, known: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    known
        .into_iter()
        .any(|name| site.band_reading(name).is_some_and(|value| value != 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn site_with(readings: &[(&str, f64)]) -> SiteState {
        SiteState {
            reference: "s1".into(),
            band_info: readings
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<BTreeMap<_, _>>(),
            ..Default::default()
        }
    }

    #[test]
    fn zero_and_missing_readings_are_hidden() {
        let site = site_with(&[("radiation", 3.0), ("gravity", 0.0)]);
        let catalog = ["gravity", "radiation", "plasma"];
        assert_eq!(visible_bands(&site, catalog), vec!["radiation"]);
    }

    #[test]
    fn names_outside_catalog_are_never_returned() {
        let site = site_with(&[("radiation", 3.0), ("unlisted", 9.0)]);
        assert_eq!(visible_bands(&site, ["radiation"]), vec!["radiation"]);
    }

    #[test]
    fn catalog_order_wins_over_reading_order() {
        let site = site_with(&[("alpha", 1.0), ("beta", 2.0), ("gamma", -4.0)]);
        assert_eq!(
            visible_bands(&site, ["gamma", "alpha", "beta"]),
            vec!["gamma", "alpha", "beta"]
        );
    }

    #[test]
    fn empty_inputs_yield_nothing() {
        let site = site_with(&[]);
        assert!(visible_bands(&site, ["radiation"]).is_empty());
        assert!(visible_bands(&site_with(&[("radiation", 2.0)]), Vec::<&str>::new()).is_empty());
        assert!(!has_band_readings(&site, ["radiation"]));
    }
}
