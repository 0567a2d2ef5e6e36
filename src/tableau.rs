//! Immutable coefficient tables describing explicit one-step methods.
//!
//! A [`Tableau`] bundles everything the generic stepper, controller, and
//! dense interpolant need to run a Runge-Kutta-family method: the strictly
//! lower-triangular stage matrix `a`, node offsets `c`, solution weights `b`,
//! optional embedded error weights `e = b - b*`, the declared order, and a
//! [`DenseRule`] for continuous output. Tableaus are plain static data shared
//! read-only across every integration that uses the method.

use crate::Float;

/// Coefficient table for an explicit Runge-Kutta-family one-step method.
#[derive(Debug)]
pub struct Tableau {
    pub name: &'static str,
    /// Classical order of the propagating solution.
    pub order: usize,
    /// Number of stage derivative evaluations per step.
    pub stages: usize,
    /// Stage coefficient rows; row `i` holds the `i` entries `a[i][0..i]`.
    /// Strictly lower-triangular, so no implicit solve is ever required.
    pub a: &'static [&'static [Float]],
    /// Node offsets, one per stage.
    pub c: &'static [Float],
    /// Solution weights.
    pub b: &'static [Float],
    /// Embedded error weights `b - b*`. `None` means the method carries no
    /// error estimate and can only run fixed-step.
    pub e: Option<&'static [Float]>,
    /// First-same-as-last: the final stage derivative equals the first stage
    /// derivative of the next step, saving one evaluation per accepted step.
    pub fsal: bool,
    /// How to build the continuous interpolant over an accepted interval.
    pub dense: DenseRule,
}

impl Tableau {
    /// Whether the method supplies an embedded error estimate.
    pub fn embedded(&self) -> bool {
        self.e.is_some()
    }
}

/// Dense-output strategy declared by a tableau.
#[derive(Debug)]
pub enum DenseRule {
    /// Cubic Hermite from the interval endpoints and their derivatives.
    /// Always available; third-order accurate.
    Hermite,
    /// Tableau-native interpolation: a polynomial in the normalized position
    /// `theta` over the stage derivatives, optionally extended by extra
    /// stages evaluated lazily on the first query inside the interval.
    Poly(&'static PolyDense),
}

/// Stage-weight polynomials for tableau-native dense output.
///
/// The interpolant is `u(theta) = u0 + h * sum_i w_i(theta) * k_i` where
/// `w_i(theta) = sum_j weights[i][j] * theta^(j+1)`. The stage list is the
/// step stages followed by the [`ExtraStage`] rows in declaration order.
#[derive(Debug)]
pub struct PolyDense {
    pub weights: &'static [&'static [Float]],
    pub extra: &'static [ExtraStage],
}

/// An additional stage derivative needed only for interpolation.
///
/// `a` spans all stages already available when the row is evaluated: the
/// step stages first, then earlier extra stages.
#[derive(Debug)]
pub struct ExtraStage {
    pub c: Float,
    pub a: &'static [Float],
}

// --- Euler (order 1, fixed-step) ---

static EULER_A: [&[Float]; 1] = [&[]];
static EULER_C: [Float; 1] = [0.0];
static EULER_B: [Float; 1] = [1.0];

pub static EULER: Tableau = Tableau {
    name: "Euler",
    order: 1,
    stages: 1,
    a: &EULER_A,
    c: &EULER_C,
    b: &EULER_B,
    e: None,
    fsal: false,
    dense: DenseRule::Hermite,
};

// --- Classic RK4 (order 4, fixed-step) ---

static RK4_A1: [Float; 1] = [0.5];
static RK4_A2: [Float; 2] = [0.0, 0.5];
static RK4_A3: [Float; 3] = [0.0, 0.0, 1.0];
static RK4_A: [&[Float]; 4] = [&[], &RK4_A1, &RK4_A2, &RK4_A3];
static RK4_C: [Float; 4] = [0.0, 0.5, 0.5, 1.0];
static RK4_B: [Float; 4] = [1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0];

pub static RK4: Tableau = Tableau {
    name: "RK4",
    order: 4,
    stages: 4,
    a: &RK4_A,
    c: &RK4_C,
    b: &RK4_B,
    e: None,
    fsal: false,
    dense: DenseRule::Hermite,
};

// --- Bogacki-Shampine 3(2) (order 3, embedded order 2, FSAL) ---

static BS23_A1: [Float; 1] = [0.5];
static BS23_A2: [Float; 2] = [0.0, 0.75];
static BS23_A3: [Float; 3] = [2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0];
static BS23_A: [&[Float]; 4] = [&[], &BS23_A1, &BS23_A2, &BS23_A3];
static BS23_C: [Float; 4] = [0.0, 0.5, 0.75, 1.0];
static BS23_B: [Float; 4] = [2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0, 0.0];
static BS23_E: [Float; 4] = [5.0 / 72.0, -1.0 / 12.0, -1.0 / 9.0, 1.0 / 8.0];

// Cubic stage-weight polynomials reproducing the step endpoints exactly.
static BS23_W1: [Float; 3] = [1.0, -4.0 / 3.0, 5.0 / 9.0];
static BS23_W2: [Float; 3] = [0.0, 1.0, -2.0 / 3.0];
static BS23_W3: [Float; 3] = [0.0, 4.0 / 3.0, -8.0 / 9.0];
static BS23_W4: [Float; 3] = [0.0, -1.0, 1.0];
static BS23_WEIGHTS: [&[Float]; 4] = [&BS23_W1, &BS23_W2, &BS23_W3, &BS23_W4];
static BS23_POLY: PolyDense = PolyDense {
    weights: &BS23_WEIGHTS,
    extra: &[],
};

pub static BS23: Tableau = Tableau {
    name: "BS23",
    order: 3,
    stages: 4,
    a: &BS23_A,
    c: &BS23_C,
    b: &BS23_B,
    e: Some(&BS23_E),
    fsal: true,
    dense: DenseRule::Poly(&BS23_POLY),
};

// --- Dormand-Prince 5(4) (order 5, embedded order 4, FSAL) ---

static DOPRI5_A1: [Float; 1] = [0.2];
static DOPRI5_A2: [Float; 2] = [3.0 / 40.0, 9.0 / 40.0];
static DOPRI5_A3: [Float; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
static DOPRI5_A4: [Float; 4] = [
    19372.0 / 6561.0,
    -25360.0 / 2187.0,
    64448.0 / 6561.0,
    -212.0 / 729.0,
];
static DOPRI5_A5: [Float; 5] = [
    9017.0 / 3168.0,
    -355.0 / 33.0,
    46732.0 / 5247.0,
    49.0 / 176.0,
    -5103.0 / 18656.0,
];
static DOPRI5_A6: [Float; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];
static DOPRI5_A: [&[Float]; 7] = [
    &[],
    &DOPRI5_A1,
    &DOPRI5_A2,
    &DOPRI5_A3,
    &DOPRI5_A4,
    &DOPRI5_A5,
    &DOPRI5_A6,
];
static DOPRI5_C: [Float; 7] = [0.0, 0.2, 0.3, 0.8, 8.0 / 9.0, 1.0, 1.0];

const DP_B1: Float = 35.0 / 384.0;
const DP_B3: Float = 500.0 / 1113.0;
const DP_B4: Float = 125.0 / 192.0;
const DP_B5: Float = -2187.0 / 6784.0;
const DP_B6: Float = 11.0 / 84.0;

static DOPRI5_B: [Float; 7] = [DP_B1, 0.0, DP_B3, DP_B4, DP_B5, DP_B6, 0.0];
static DOPRI5_E: [Float; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const DP_D1: Float = -12715105075.0 / 11282082432.0;
const DP_D3: Float = 87487479700.0 / 32700410799.0;
const DP_D4: Float = -10690763975.0 / 1880347072.0;
const DP_D5: Float = 701980252875.0 / 199316789632.0;
const DP_D6: Float = -1453857185.0 / 822651844.0;
const DP_D7: Float = 69997945.0 / 29380423.0;

// Quartic stage-weight polynomials, expanded from the Hairer contd5 form
// u(theta) = u0 + theta*(ydiff + (1-theta)*(bspl + theta*(c3 + (1-theta)*c4))).
static DOPRI5_W1: [Float; 4] = [
    1.0,
    3.0 * DP_B1 - 2.0 + DP_D1,
    1.0 - 2.0 * DP_B1 - 2.0 * DP_D1,
    DP_D1,
];
static DOPRI5_W2: [Float; 4] = [0.0, 0.0, 0.0, 0.0];
static DOPRI5_W3: [Float; 4] = [
    0.0,
    3.0 * DP_B3 + DP_D3,
    -2.0 * DP_B3 - 2.0 * DP_D3,
    DP_D3,
];
static DOPRI5_W4: [Float; 4] = [
    0.0,
    3.0 * DP_B4 + DP_D4,
    -2.0 * DP_B4 - 2.0 * DP_D4,
    DP_D4,
];
static DOPRI5_W5: [Float; 4] = [
    0.0,
    3.0 * DP_B5 + DP_D5,
    -2.0 * DP_B5 - 2.0 * DP_D5,
    DP_D5,
];
static DOPRI5_W6: [Float; 4] = [
    0.0,
    3.0 * DP_B6 + DP_D6,
    -2.0 * DP_B6 - 2.0 * DP_D6,
    DP_D6,
];
static DOPRI5_W7: [Float; 4] = [0.0, DP_D7 - 1.0, 1.0 - 2.0 * DP_D7, DP_D7];
static DOPRI5_WEIGHTS: [&[Float]; 7] = [
    &DOPRI5_W1,
    &DOPRI5_W2,
    &DOPRI5_W3,
    &DOPRI5_W4,
    &DOPRI5_W5,
    &DOPRI5_W6,
    &DOPRI5_W7,
];
static DOPRI5_POLY: PolyDense = PolyDense {
    weights: &DOPRI5_WEIGHTS,
    extra: &[],
};

pub static DOPRI5: Tableau = Tableau {
    name: "DOPRI5",
    order: 5,
    stages: 7,
    a: &DOPRI5_A,
    c: &DOPRI5_C,
    b: &DOPRI5_B,
    e: Some(&DOPRI5_E),
    fsal: true,
    dense: DenseRule::Poly(&DOPRI5_POLY),
};
