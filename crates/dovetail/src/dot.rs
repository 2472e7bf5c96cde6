//! Graphviz output for automata

use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt::{self, Display},
};

use indexmap::IndexMap;

use crate::dfa::{Dfa, StateId};

macro_rules! attr {
    ($id:ident, $name:literal) => {
        pub fn $id<S: Into<Cow<'a, str>>>(&mut self, $id: S) -> &mut Self {
            self.attrs.insert($name, $id.into());
            self
        }
    };
}

/// A directed graph in DOT syntax
#[derive(Debug, Default)]
pub struct Graph<'a> {
    attrs: BTreeMap<&'static str, Cow<'a, str>>,
    nodes: IndexMap<Cow<'a, str>, Node<'a>>,
    edges: IndexMap<(Cow<'a, str>, Cow<'a, str>), Vec<Edge<'a>>>,
}

impl<'a> Graph<'a> {
    attr!(label, "label");

    attr!(rankdir, "rankdir");

    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn node<S: Into<Cow<'a, str>>>(&mut self, id: S) -> &mut Node<'a> {
        self.nodes.entry(id.into()).or_default()
    }

    pub fn edge<L: Into<Cow<'a, str>>, R: Into<Cow<'a, str>>>(
        &mut self,
        l: L,
        r: R,
    ) -> &mut Edge<'a> {
        let l = l.into();
        let r = r.into();
        self.node(l.clone());
        self.node(r.clone());

        let edges = self.edges.entry((l, r)).or_default();
        edges.push(Edge::default());
        edges.last_mut().unwrap_or_else(|| unreachable!())
    }
}

#[derive(Default)]
struct AttrState {
    any: bool,
}

impl AttrState {
    fn write(
        f: &mut fmt::Formatter,
        attrs: &BTreeMap<&'static str, Cow<'_, str>>,
    ) -> fmt::Result {
        let mut me = Self::default();

        for (key, val) in attrs {
            f.write_str(if me.any {
                ","
            } else {
                me.any = true;
                "["
            })?;

            write!(f, "{key}={val:?}")?;
        }

        if me.any { f.write_str("]") } else { Ok(()) }
    }
}

impl Display for Graph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Self {
            attrs,
            nodes,
            edges,
        } = self;

        f.write_str("digraph {")?;

        for (key, val) in attrs {
            write!(f, "{key}={val:?};")?;
        }

        for (id, Node { attrs }) in nodes {
            write!(f, "{id:?}")?;
            AttrState::write(f, attrs)?;
            f.write_str(";")?;
        }

        for ((l, r), edges) in edges {
            for Edge { attrs } in edges {
                write!(f, "{l:?}->{r:?}")?;
                AttrState::write(f, attrs)?;
                f.write_str(";")?;
            }
        }

        f.write_str("}")
    }
}

#[derive(Debug, Default)]
pub struct Node<'a> {
    attrs: BTreeMap<&'static str, Cow<'a, str>>,
}

impl<'a> Node<'a> {
    attr!(style, "style");

    attr!(shape, "shape");

    attr!(label, "label");

    attr!(border_count, "peripheries");
}

#[derive(Debug, Default)]
pub struct Edge<'a> {
    attrs: BTreeMap<&'static str, Cow<'a, str>>,
}

impl<'a> Edge<'a> {
    attr!(style, "style");

    attr!(label, "label");
}

/// Describe a set of symbols compactly, collapsing runs like `a-z`
fn fmt_symbols(syms: &[char]) -> String {
    fn push(out: &mut String, lo: char, hi: char) {
        if !out.is_empty() {
            out.push(' ');
        }

        out.extend(lo.escape_debug());
        if hi != lo {
            out.push(if u32::from(hi) == u32::from(lo) + 1 { ' ' } else { '-' });
            out.extend(hi.escape_debug());
        }
    }

    let mut out = String::new();
    let mut run: Option<(char, char)> = None;

    for &sym in syms {
        run = match run {
            Some((lo, hi)) if u32::from(sym) == u32::from(hi) + 1 => Some((lo, sym)),
            Some((lo, hi)) => {
                push(&mut out, lo, hi);
                Some((sym, sym))
            },
            None => Some((sym, sym)),
        };
    }

    if let Some((lo, hi)) = run {
        push(&mut out, lo, hi);
    }

    out
}

impl<T> Dfa<T> {
    /// Render this automaton as a DOT graph
    ///
    /// Final states get a double border and are labelled with `fmt_tok`;
    /// default edges are labelled `*`.
    pub fn dot<'a, F: Fn(&T) -> Cow<'a, str>>(&self, fmt_tok: F) -> Graph<'a> {
        fn id(s: StateId) -> String { s.to_string() }

        let mut graph = Graph::new();
        graph.rankdir("LR");

        for (state, node) in self.states() {
            let n = graph.node(id(state));
            n.shape("circle");

            if let Some(tok) = node.accept() {
                n.border_count("2").label(format!("{state}:{}", fmt_tok(tok)));
            } else {
                n.label(id(state));
            }

            let mut by_target: BTreeMap<StateId, Vec<char>> = BTreeMap::new();
            for (&sym, &to) in node.edges() {
                by_target.entry(to).or_default().push(sym);
            }

            for (to, syms) in by_target {
                graph.edge(id(state), id(to)).label(fmt_symbols(&syms));
            }

            if let Some(to) = node.otherwise() {
                graph.edge(id(state), id(to)).label("*").style("dashed");
            }
        }

        graph
            .node("_start")
            .style("invis")
            .shape("point")
            .label("");
        graph.edge("_start", id(self.start()));

        graph
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog;

    #[test]
    fn symbol_runs() {
        assert_eq!(fmt_symbols(&['a']), "a");
        assert_eq!(fmt_symbols(&['a', 'b']), "a b");
        assert_eq!(fmt_symbols(&['0', '1', '2', '_', 'a', 'b', 'c', 'z']), "0-2 _ a-c z");
        assert_eq!(fmt_symbols(&['\t', '\n']), "\\t \\n");
    }

    #[test]
    fn literal_graph() {
        let dfa = Dfa::literal("is", "kw").unwrap();
        let dot = dfa.dot(|t| (*t).into()).to_string();

        assert_eq!(
            dot,
            "digraph {rankdir=\"LR\";\
             \"q0\"[label=\"q0\",shape=\"circle\"];\
             \"q1\"[label=\"q1\",shape=\"circle\"];\
             \"q2\"[label=\"q2:kw\",peripheries=\"2\",shape=\"circle\"];\
             \"_start\"[label=\"\",shape=\"point\",style=\"invis\"];\
             \"q0\"->\"q1\"[label=\"i\"];\
             \"q1\"->\"q2\"[label=\"s\"];\
             \"_start\"->\"q0\";}"
        );
    }

    #[test]
    fn comment_graph_has_default_edge() {
        let dfa = catalog::line_comment("comment").unwrap();
        let dot = dfa.dot(|t| (*t).into()).to_string();

        assert!(dot.contains("\"q2\"->\"q2\"[label=\"*\",style=\"dashed\"]"));
        assert!(dot.contains("\"q2\"->\"q3\"[label=\"\\\\n\"]"));
    }
}
