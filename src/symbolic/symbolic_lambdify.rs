use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    /// Converts a single-variable symbolic expression into an executable
    /// closure. Whatever variable name appears in the tree is bound to the
    /// argument; callers must substitute all other symbols first.
    pub fn lambdify1D(&self) -> Box<dyn Fn(f64) -> f64> {
        match self {
            Expr::Var(_) => Box::new(|x| x),
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_| val)
            }
            Expr::Add(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1D();
                let rhs_fn = rhs.lambdify1D();
                Box::new(move |x| lhs_fn(x) + rhs_fn(x))
            }
            Expr::Sub(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1D();
                let rhs_fn = rhs.lambdify1D();
                Box::new(move |x| lhs_fn(x) - rhs_fn(x))
            }
            Expr::Mul(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1D();
                let rhs_fn = rhs.lambdify1D();
                Box::new(move |x| lhs_fn(x) * rhs_fn(x))
            }
            Expr::Div(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1D();
                let rhs_fn = rhs.lambdify1D();
                Box::new(move |x| lhs_fn(x) / rhs_fn(x))
            }
            Expr::Pow(base, exp) => {
                let base_fn = base.lambdify1D();
                let exp_fn = exp.lambdify1D();
                Box::new(move |x| base_fn(x).powf(exp_fn(x)))
            }
            Expr::Exp(expr) => {
                let expr_fn = expr.lambdify1D();
                Box::new(move |x| expr_fn(x).exp())
            }
            Expr::Ln(expr) => {
                let expr_fn = expr.lambdify1D();
                Box::new(move |x| expr_fn(x).ln())
            }
            Expr::sin(expr) => {
                let expr_fn = expr.lambdify1D();
                Box::new(move |x| expr_fn(x).sin())
            }
            Expr::cos(expr) => {
                let expr_fn = expr.lambdify1D();
                Box::new(move |x| expr_fn(x).cos())
            }
            Expr::tg(expr) => {
                let expr_fn = expr.lambdify1D();
                Box::new(move |x| expr_fn(x).tan())
            }
        }
    }

    /// Converts an expression over the variables "x" and "y" into a
    /// two-argument closure, the shape every fixed-step integrator consumes
    /// as its right-hand side f(x, y). Any other variable name evaluates to
    /// NaN, which the integrator's finiteness check turns into a solve
    /// failure rather than a silent wrong number.
    pub fn lambdify_xy(&self) -> Box<dyn Fn(f64, f64) -> f64> {
        match self {
            Expr::Var(name) => match name.as_str() {
                "x" => Box::new(|x, _| x),
                "y" => Box::new(|_, y| y),
                _ => Box::new(|_, _| f64::NAN),
            },
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_, _| val)
            }
            Expr::Add(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_xy();
                let rhs_fn = rhs.lambdify_xy();
                Box::new(move |x, y| lhs_fn(x, y) + rhs_fn(x, y))
            }
            Expr::Sub(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_xy();
                let rhs_fn = rhs.lambdify_xy();
                Box::new(move |x, y| lhs_fn(x, y) - rhs_fn(x, y))
            }
            Expr::Mul(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_xy();
                let rhs_fn = rhs.lambdify_xy();
                Box::new(move |x, y| lhs_fn(x, y) * rhs_fn(x, y))
            }
            Expr::Div(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_xy();
                let rhs_fn = rhs.lambdify_xy();
                Box::new(move |x, y| lhs_fn(x, y) / rhs_fn(x, y))
            }
            Expr::Pow(base, exp) => {
                let base_fn = base.lambdify_xy();
                let exp_fn = exp.lambdify_xy();
                Box::new(move |x, y| base_fn(x, y).powf(exp_fn(x, y)))
            }
            Expr::Exp(expr) => {
                let expr_fn = expr.lambdify_xy();
                Box::new(move |x, y| expr_fn(x, y).exp())
            }
            Expr::Ln(expr) => {
                let expr_fn = expr.lambdify_xy();
                Box::new(move |x, y| expr_fn(x, y).ln())
            }
            Expr::sin(expr) => {
                let expr_fn = expr.lambdify_xy();
                Box::new(move |x, y| expr_fn(x, y).sin())
            }
            Expr::cos(expr) => {
                let expr_fn = expr.lambdify_xy();
                Box::new(move |x, y| expr_fn(x, y).cos())
            }
            Expr::tg(expr) => {
                let expr_fn = expr.lambdify_xy();
                Box::new(move |x, y| expr_fn(x, y).tan())
            }
        }
    }
}
