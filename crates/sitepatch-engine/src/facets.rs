use sitepatch_contracts::config::FacetPools;

use crate::seed::RandomStream;

/// One draw from each facet pool. Recomputed from the seed on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facets {
    pub style: String,
    pub mood: String,
    pub light: String,
    pub composition: String,
    pub wardrobe: String,
    pub background: String,
}

impl Facets {
    /// Draws in a fixed order: style, mood, light, composition, wardrobe, background.
    pub fn draw(pools: &FacetPools, rand: &mut RandomStream) -> Self {
        Self {
            style: rand.choose_str(&pools.styles).to_string(),
            mood: rand.choose_str(&pools.moods).to_string(),
            light: rand.choose_str(&pools.lights).to_string(),
            composition: rand.choose_str(&pools.compositions).to_string(),
            wardrobe: rand.choose_str(&pools.wardrobes).to_string(),
            background: rand.choose_str(&pools.backgrounds).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use sitepatch_contracts::config::FacetPools;

    use super::Facets;
    use crate::seed::stream;

    #[test]
    fn draw_is_stable_and_in_pool() {
        let pools = FacetPools::default();
        let first = Facets::draw(&pools, &mut stream("t::a.html"));
        let second = Facets::draw(&pools, &mut stream("t::a.html"));
        assert_eq!(first, second);
        assert!(pools.styles.contains(&first.style));
        assert!(pools.backgrounds.contains(&first.background));
    }

    #[test]
    fn empty_pool_draws_empty_value() {
        let pools = FacetPools {
            moods: Vec::new(),
            ..FacetPools::default()
        };
        let facets = Facets::draw(&pools, &mut stream("x"));
        assert_eq!(facets.mood, "");
        assert!(!facets.style.is_empty());
    }
}
