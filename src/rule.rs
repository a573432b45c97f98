use crate::{
    color_cluster::ColorCluster,
    error::{Error, Result},
};

const TARGET_PRIMARY_PERCENTAGE: f64 = 60.0;
const TARGET_SECONDARY_PERCENTAGE: f64 = 30.0;
const TARGET_ACCENT_PERCENTAGE: f64 = 10.0;

// min, max
const FIXED_PRIMARY_BAND: (f64, f64) = (50.0, 70.0);
const FIXED_SECONDARY_BAND: (f64, f64) = (20.0, 40.0);
const FIXED_ACCENT_BAND: (f64, f64) = (5.0, 15.0);

/// How a role's percentage is checked against its target. All bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BandPolicy {
    /// The percentage must reach the target: primary >= 60, secondary >= 30, accent >= 10.
    StrictThreshold,
    /// Fixed bands around the targets: primary in [50, 70], secondary in [20, 40], accent in [5, 15].
    #[default]
    FixedBand,
    /// The percentage must be within the given number of points of the target, e.g. primary in [60 - t, 60 + t].
    SymmetricTolerance(f64),
}

impl BandPolicy {
    /// Check that a symmetric tolerance is a finite, non-negative number.
    pub fn validate(self) -> Result<Self> {
        match self {
            BandPolicy::SymmetricTolerance(tolerance) if !tolerance.is_finite() || tolerance < 0.0 => {
                Err(Error::InvalidTolerance(tolerance))
            }
            policy => Ok(policy),
        }
    }

    /// Return the inclusive (min, max) percentage range accepted for a role.
    pub fn band(self, role: Role) -> (f64, f64) {
        match self {
            BandPolicy::StrictThreshold => (role.target_percentage(), f64::INFINITY),
            BandPolicy::FixedBand => match role {
                Role::Primary => FIXED_PRIMARY_BAND,
                Role::Secondary => FIXED_SECONDARY_BAND,
                Role::Accent => FIXED_ACCENT_BAND,
            },
            BandPolicy::SymmetricTolerance(tolerance) => (
                role.target_percentage() - tolerance,
                role.target_percentage() + tolerance,
            ),
        }
    }

    pub fn accepts(self, role: Role, percentage: f64) -> bool {
        let (min, max) = self.band(role);
        (min..=max).contains(&percentage)
    }
}

/// A color role, assigned by rank of pixel share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Primary,
    Secondary,
    Accent,
}

impl Role {
    pub fn all() -> [Role; 3] {
        [Role::Primary, Role::Secondary, Role::Accent]
    }

    pub fn target_percentage(self) -> f64 {
        match self {
            Role::Primary => TARGET_PRIMARY_PERCENTAGE,
            Role::Secondary => TARGET_SECONDARY_PERCENTAGE,
            Role::Accent => TARGET_ACCENT_PERCENTAGE,
        }
    }
}

/// A cluster color together with its share of the considered pixels, in percent. A role with no cluster to fill it is
/// represented with no color and a percentage of 0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedColor {
    color: Option<(u8, u8, u8)>,
    percentage: f64,
}

impl RankedColor {
    pub fn new(color: (u8, u8, u8), percentage: f64) -> Self {
        Self {
            color: Some(color),
            percentage,
        }
    }

    pub fn absent() -> Self {
        Self {
            color: None,
            percentage: 0.0,
        }
    }

    pub fn color(self) -> Option<(u8, u8, u8)> {
        self.color
    }

    pub fn percentage(self) -> f64 {
        self.percentage
    }

    pub fn is_absent(self) -> bool {
        self.color.is_none()
    }

    /// The color as a lowercase `#rrggbb` string.
    pub fn hex(self) -> Option<String> {
        self.color.map(|(r, g, b)| format!("#{r:02x}{g:02x}{b:02x}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleChecks {
    primary_ok: bool,
    secondary_ok: bool,
    accent_ok: bool,
}

impl RoleChecks {
    pub fn primary_ok(self) -> bool {
        self.primary_ok
    }

    pub fn secondary_ok(self) -> bool {
        self.secondary_ok
    }

    pub fn accent_ok(self) -> bool {
        self.accent_ok
    }

    pub fn is_ok(self, role: Role) -> bool {
        match role {
            Role::Primary => self.primary_ok,
            Role::Secondary => self.secondary_ok,
            Role::Accent => self.accent_ok,
        }
    }

    pub fn all_ok(self) -> bool {
        self.primary_ok && self.secondary_ok && self.accent_ok
    }
}

/// The outcome of checking a set of clusters against the 60-30-10 rule.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleResult {
    primary_color: RankedColor,
    secondary_color: RankedColor,
    accent_color: RankedColor,
    rule_followed: bool,
    details: RoleChecks,
}

impl RuleResult {
    pub fn primary(&self) -> RankedColor {
        self.primary_color
    }

    pub fn secondary(&self) -> RankedColor {
        self.secondary_color
    }

    pub fn accent(&self) -> RankedColor {
        self.accent_color
    }

    pub fn role(&self, role: Role) -> RankedColor {
        match role {
            Role::Primary => self.primary_color,
            Role::Secondary => self.secondary_color,
            Role::Accent => self.accent_color,
        }
    }

    pub fn rule_followed(&self) -> bool {
        self.rule_followed
    }

    pub fn details(&self) -> RoleChecks {
        self.details
    }
}

/// Convert clusters to percentages of the total member count and sort them by percentage, largest first. Equal
/// percentages keep their input order. If the total is zero every percentage is 0.
pub fn rank(clusters: &[ColorCluster]) -> Vec<RankedColor> {
    let total = clusters.iter().map(|cluster| cluster.member_count()).sum::<u64>();

    let mut ranked = clusters
        .iter()
        .map(|cluster| {
            let percentage = if total > 0 {
                cluster.member_count() as f64 * 100.0 / total as f64
            } else {
                0.0
            };

            RankedColor::new(cluster.rgb(), percentage)
        })
        .collect::<Vec<_>>();

    // sort_by is stable
    ranked.sort_by(|lhs, rhs| rhs.percentage.total_cmp(&lhs.percentage));
    ranked
}

/// Assign the three largest clusters to the primary, secondary and accent roles and check each against its band.
///
/// A role without a cluster is absent and fails its check, so fewer than three clusters never follow the rule.
pub fn evaluate(clusters: &[ColorCluster], policy: BandPolicy) -> RuleResult {
    let ranked = rank(clusters);
    let [primary, secondary, accent] = Role::all().map(|role| {
        ranked.get(role as usize).copied().unwrap_or_else(RankedColor::absent)
    });

    let check = |role: Role, ranked: RankedColor| !ranked.is_absent() && policy.accepts(role, ranked.percentage);
    let details = RoleChecks {
        primary_ok: check(Role::Primary, primary),
        secondary_ok: check(Role::Secondary, secondary),
        accent_ok: check(Role::Accent, accent),
    };

    RuleResult {
        primary_color: primary,
        secondary_color: secondary,
        accent_color: accent,
        rule_followed: details.all_ok(),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: (u8, u8, u8) = (255, 0, 0);
    const GREEN: (u8, u8, u8) = (0, 255, 0);
    const BLUE: (u8, u8, u8) = (0, 0, 255);

    fn clusters(counts: &[((u8, u8, u8), u64)]) -> Vec<ColorCluster> {
        counts.iter().map(|&(rgb, count)| ColorCluster::new(rgb, count)).collect()
    }

    #[test]
    fn sixty_thirty_ten_follows_every_policy() {
        let clusters = clusters(&[(BLUE, 10), (RED, 60), (GREEN, 30)]);

        for policy in [
            BandPolicy::StrictThreshold,
            BandPolicy::FixedBand,
            BandPolicy::SymmetricTolerance(5.0),
            BandPolicy::SymmetricTolerance(0.0),
        ] {
            let result = evaluate(&clusters, policy);

            assert_eq!(result.primary(), RankedColor::new(RED, 60.0));
            assert_eq!(result.secondary(), RankedColor::new(GREEN, 30.0));
            assert_eq!(result.accent(), RankedColor::new(BLUE, 10.0));
            assert!(result.rule_followed(), "{policy:?}");
        }
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let ranked = rank(&clusters(&[(RED, 7), (GREEN, 11), (BLUE, 13)]));
        let sum = ranked.iter().map(|ranked| ranked.percentage()).sum::<f64>();

        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn equal_percentages_keep_input_order() {
        let ranked = rank(&clusters(&[(GREEN, 25), (RED, 50), (BLUE, 25)]));

        assert_eq!(ranked[0].color(), Some(RED));
        assert_eq!(ranked[1].color(), Some(GREEN));
        assert_eq!(ranked[2].color(), Some(BLUE));
    }

    #[test]
    fn fixed_band_edges_are_inclusive() {
        let policy = BandPolicy::FixedBand;

        assert!(!policy.accepts(Role::Primary, 49.999));
        assert!(policy.accepts(Role::Primary, 50.0));
        assert!(policy.accepts(Role::Primary, 70.0));
        assert!(!policy.accepts(Role::Primary, 70.001));

        assert!(!policy.accepts(Role::Secondary, 19.999));
        assert!(policy.accepts(Role::Secondary, 40.0));
        assert!(policy.accepts(Role::Accent, 5.0));
        assert!(!policy.accepts(Role::Accent, 15.001));
    }

    #[test]
    fn strict_threshold_has_no_upper_bound() {
        let policy = BandPolicy::StrictThreshold;

        assert!(!policy.accepts(Role::Primary, 59.999));
        assert!(policy.accepts(Role::Primary, 60.0));
        assert!(policy.accepts(Role::Primary, 100.0));
        assert!(policy.accepts(Role::Accent, 10.0));
    }

    #[test]
    fn symmetric_tolerance_is_centred_on_target() {
        let policy = BandPolicy::SymmetricTolerance(2.5);

        assert_eq!(policy.band(Role::Secondary), (27.5, 32.5));
        assert!(policy.accepts(Role::Accent, 7.5));
        assert!(!policy.accepts(Role::Accent, 7.499));
    }

    #[test]
    fn one_role_out_of_band_breaks_the_rule() {
        // 72 / 20 / 8
        let result = evaluate(&clusters(&[(RED, 72), (GREEN, 20), (BLUE, 8)]), BandPolicy::FixedBand);

        assert!(!result.details().primary_ok());
        assert!(result.details().secondary_ok());
        assert!(result.details().accent_ok());
        assert!(!result.rule_followed());
    }

    #[test]
    fn missing_roles_are_absent_and_fail() {
        let result = evaluate(&clusters(&[(RED, 65), (GREEN, 35)]), BandPolicy::FixedBand);

        assert_eq!(result.accent(), RankedColor::absent());
        assert_eq!(result.accent().hex(), None);
        assert!(result.details().primary_ok());
        assert!(result.details().secondary_ok());
        assert!(!result.details().accent_ok());
        assert!(!result.rule_followed());
    }

    #[test]
    fn no_clusters() {
        let result = evaluate(&[], BandPolicy::StrictThreshold);

        for role in Role::all() {
            assert!(result.role(role).is_absent());
            assert!(!result.details().is_ok(role));
        }
        assert!(!result.rule_followed());
    }

    #[test]
    fn zero_members_do_not_divide_by_zero() {
        let ranked = rank(&clusters(&[(RED, 0), (GREEN, 0)]));
        assert!(ranked.iter().all(|ranked| ranked.percentage() == 0.0));
    }

    #[test]
    fn extra_clusters_only_fill_three_roles() {
        let result = evaluate(
            &clusters(&[(RED, 55), (GREEN, 25), (BLUE, 10), ((9, 9, 9), 10)]),
            BandPolicy::FixedBand,
        );

        assert_eq!(result.accent().color(), Some(BLUE));
        assert!(result.rule_followed());
    }

    #[test]
    fn counts_beyond_u32_rank_without_overflow() {
        let billions = u32::MAX as u64;
        let result = evaluate(
            &clusters(&[(BLUE, billions), (RED, billions * 6), (GREEN, billions * 3)]),
            BandPolicy::FixedBand,
        );

        assert_eq!(result.primary().color(), Some(RED));
        assert!((result.primary().percentage() - 60.0).abs() < 1e-9);
        assert!((result.accent().percentage() - 10.0).abs() < 1e-9);
        assert!(result.rule_followed());
    }

    #[test]
    fn hex_codes() {
        assert_eq!(RankedColor::new((255, 128, 1), 1.0).hex().as_deref(), Some("#ff8001"));
    }

    #[test]
    fn invalid_tolerance_rejected() {
        assert!(BandPolicy::SymmetricTolerance(-1.0).validate().is_err());
        assert!(BandPolicy::SymmetricTolerance(f64::NAN).validate().is_err());
        assert!(BandPolicy::SymmetricTolerance(0.0).validate().is_ok());
        assert_eq!(BandPolicy::FixedBand.validate().unwrap(), BandPolicy::FixedBand);
    }
}
