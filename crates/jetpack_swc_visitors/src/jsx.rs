use jetpack_swc_utils::{ident, is_valid_identifier, str_lit};
use swc_core::{
  common::{util::take::Take, Span, SyntaxContext, DUMMY_SP},
  ecma::{
    ast::{self, Expr},
    atoms::Atom,
    visit::{VisitMut, VisitMutWith},
  },
};

/// Lowers JSX to `React.createElement(tag, props, ...children)` calls.
///
/// Must run before the resolver, the generated `React` reference binds like handwritten code.
pub fn jsx_lowering() -> impl VisitMut {
  JsxLowering
}

struct JsxLowering;

impl JsxLowering {
  fn react_member(&self, prop: &str) -> Box<Expr> {
    Box::new(Expr::Member(ast::MemberExpr {
      span: DUMMY_SP,
      obj: Box::new(Expr::Ident(ident("React", SyntaxContext::empty()))),
      prop: ast::MemberProp::Ident(ast::IdentName::new(prop.into(), DUMMY_SP)),
    }))
  }

  fn create_element(&self, span: Span, tag: Box<Expr>, props: Box<Expr>, children: Vec<ast::ExprOrSpread>) -> Expr {
    let mut args = vec![tag.into(), props.into()];
    args.extend(children);
    Expr::Call(ast::CallExpr {
      span,
      callee: ast::Callee::Expr(self.react_member("createElement")),
      args,
      ..Default::default()
    })
  }

  fn convert_element(&self, element: ast::JSXElement) -> Expr {
    let tag = self.convert_tag(element.opening.name);
    let props = self.convert_attrs(element.opening.attrs);
    let children = self.convert_children(element.children);
    self.create_element(element.span, tag, props, children)
  }

  fn convert_fragment(&self, fragment: ast::JSXFragment) -> Expr {
    let children = self.convert_children(fragment.children);
    self.create_element(
      fragment.span,
      self.react_member("Fragment"),
      null(),
      children,
    )
  }

  fn convert_tag(&self, name: ast::JSXElementName) -> Box<Expr> {
    match name {
      // Lowercase names are intrinsic elements
      ast::JSXElementName::Ident(ident)
        if ident.sym.starts_with(|c: char| c.is_ascii_lowercase()) =>
      {
        Box::new(Expr::Lit(ast::Lit::Str(ast::Str {
          span: ident.span,
          value: ident.sym,
          raw: None,
        })))
      }
      ast::JSXElementName::Ident(ident) => Box::new(Expr::Ident(ident)),
      ast::JSXElementName::JSXMemberExpr(member) => self.convert_member(member),
      ast::JSXElementName::JSXNamespacedName(name) => Box::new(Expr::Lit(ast::Lit::Str(
        str_lit(format!("{}:{}", name.ns.sym, name.name.sym)),
      ))),
    }
  }

  fn convert_member(&self, member: ast::JSXMemberExpr) -> Box<Expr> {
    let obj = match member.obj {
      ast::JSXObject::Ident(ident) => Box::new(Expr::Ident(ident)),
      ast::JSXObject::JSXMemberExpr(inner) => self.convert_member(*inner),
    };
    Box::new(Expr::Member(ast::MemberExpr {
      span: DUMMY_SP,
      obj,
      prop: ast::MemberProp::Ident(member.prop),
    }))
  }

  fn convert_attrs(&self, attrs: Vec<ast::JSXAttrOrSpread>) -> Box<Expr> {
    if attrs.is_empty() {
      return null();
    }
    let props = attrs
      .into_iter()
      .map(|attr| match attr {
        ast::JSXAttrOrSpread::SpreadElement(spread) => ast::PropOrSpread::Spread(spread),
        ast::JSXAttrOrSpread::JSXAttr(attr) => {
          let name: Atom = match attr.name {
            ast::JSXAttrName::Ident(name) => name.sym,
            ast::JSXAttrName::JSXNamespacedName(name) => {
              format!("{}:{}", name.ns.sym, name.name.sym).into()
            }
          };
          let key = if is_valid_identifier(&name) {
            ast::PropName::Ident(ast::IdentName::new(name, DUMMY_SP))
          } else {
            ast::PropName::Str(str_lit(name))
          };
          let value = match attr.value {
            None => Box::new(Expr::Lit(ast::Lit::Bool(ast::Bool {
              span: DUMMY_SP,
              value: true,
            }))),
            Some(ast::JSXAttrValue::Lit(lit)) => Box::new(Expr::Lit(lit)),
            Some(ast::JSXAttrValue::JSXExprContainer(container)) => match container.expr {
              ast::JSXExpr::Expr(expr) => expr,
              ast::JSXExpr::JSXEmptyExpr(_) => Box::new(Expr::Lit(ast::Lit::Bool(ast::Bool {
                span: DUMMY_SP,
                value: true,
              }))),
            },
            Some(ast::JSXAttrValue::JSXElement(element)) => Box::new(self.convert_element(*element)),
            Some(ast::JSXAttrValue::JSXFragment(fragment)) => Box::new(self.convert_fragment(fragment)),
          };
          ast::PropOrSpread::Prop(Box::new(ast::Prop::KeyValue(ast::KeyValueProp { key, value })))
        }
      })
      .collect();
    Box::new(Expr::Object(ast::ObjectLit {
      span: DUMMY_SP,
      props,
    }))
  }

  fn convert_children(&self, children: Vec<ast::JSXElementChild>) -> Vec<ast::ExprOrSpread> {
    children
      .into_iter()
      .filter_map(|child| match child {
        ast::JSXElementChild::JSXText(text) => {
          let value = normalize_jsx_text(&text.value)?;
          Some(
            Box::new(Expr::Lit(ast::Lit::Str(ast::Str {
              span: text.span,
              value: value.into(),
              raw: None,
            })))
            .into(),
          )
        }
        ast::JSXElementChild::JSXExprContainer(container) => match container.expr {
          ast::JSXExpr::Expr(expr) => Some(expr.into()),
          ast::JSXExpr::JSXEmptyExpr(_) => None,
        },
        ast::JSXElementChild::JSXSpreadChild(spread) => Some(ast::ExprOrSpread {
          spread: Some(DUMMY_SP),
          expr: spread.expr,
        }),
        ast::JSXElementChild::JSXElement(element) => Some(Box::new(self.convert_element(*element)).into()),
        ast::JSXElementChild::JSXFragment(fragment) => {
          Some(Box::new(self.convert_fragment(fragment)).into())
        }
      })
      .collect()
  }
}

impl VisitMut for JsxLowering {
  fn visit_mut_expr(&mut self, expr: &mut Expr) {
    expr.visit_mut_children_with(self);
    if matches!(expr, Expr::JSXElement(_) | Expr::JSXFragment(_)) {
      *expr = match expr.take() {
        Expr::JSXElement(element) => self.convert_element(*element),
        Expr::JSXFragment(fragment) => self.convert_fragment(fragment),
        other => other,
      };
    }
  }
}

fn null() -> Box<Expr> {
  Box::new(Expr::Lit(ast::Lit::Null(ast::Null { span: DUMMY_SP })))
}

/// Lines are trimmed, blank lines dropped and the rest joined with a space.
/// Text on a single line is kept as is.
fn normalize_jsx_text(text: &str) -> Option<String> {
  let lines = text.split('\n').collect::<Vec<_>>();
  if lines.len() == 1 {
    return (!text.is_empty()).then(|| text.to_string());
  }
  let last = lines.len() - 1;
  let parts = lines
    .iter()
    .enumerate()
    .map(|(idx, line)| {
      let line = if idx == 0 { *line } else { line.trim_start() };
      if idx == last {
        line
      } else {
        line.trim_end()
      }
    })
    .filter(|line| !line.is_empty())
    .collect::<Vec<_>>();
  (!parts.is_empty()).then(|| parts.join(" "))
}
