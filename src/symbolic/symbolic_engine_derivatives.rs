use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    /// Analytical differentiation with respect to `var`.
    ///
    /// Implements the usual rules recursively (sum, product, quotient,
    /// chain). The general power rule covers both constant exponents and
    /// the full u^v case via d(u^v) = u^v * (v' ln u + v u'/u).
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(
                Box::new(lhs.diff(var)),
                Box::new(rhs.diff(var)),
            ),
            Expr::Sub(lhs, rhs) => Expr::Sub(
                Box::new(lhs.diff(var)),
                Box::new(rhs.diff(var)),
            ),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
                )),
                Box::new(Expr::Mul(rhs.clone(), rhs.clone())),
            ),
            Expr::Pow(base, exp) => {
                if let Expr::Const(n) = **exp {
                    // d(u^n) = n * u^(n-1) * u'
                    Expr::Mul(
                        Box::new(Expr::Mul(
                            Box::new(Expr::Const(n)),
                            Box::new(Expr::Pow(
                                base.clone(),
                                Box::new(Expr::Const(n - 1.0)),
                            )),
                        )),
                        Box::new(base.diff(var)),
                    )
                } else if !exp.contains_variable(var) {
                    // exponent constant w.r.t. var, e.g. a rational p/q
                    Expr::Mul(
                        Box::new(Expr::Mul(
                            exp.clone(),
                            Box::new(Expr::Pow(
                                base.clone(),
                                Box::new(Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0)))),
                            )),
                        )),
                        Box::new(base.diff(var)),
                    )
                } else {
                    // d(u^v) = u^v * (v' * ln(u) + v * u'/u)
                    Expr::Mul(
                        Box::new(self.clone()),
                        Box::new(Expr::Add(
                            Box::new(Expr::Mul(
                                Box::new(exp.diff(var)),
                                Box::new(Expr::Ln(base.clone())),
                            )),
                            Box::new(Expr::Div(
                                Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                                base.clone(),
                            )),
                        )),
                    )
                }
            }
            Expr::Exp(expr) => Expr::Mul(
                Box::new(Expr::Exp(expr.clone())),
                Box::new(expr.diff(var)),
            ),
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => Expr::Mul(
                Box::new(Expr::cos(expr.clone())),
                Box::new(expr.diff(var)),
            ),
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Mul(
                    Box::new(Expr::cos(expr.clone())),
                    Box::new(Expr::cos(expr.clone())),
                )),
            ),
        }
    }
}
