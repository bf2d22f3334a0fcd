//! Nested named-phase profiler and engine statistics
//!
//! The engine wraps each frame phase in `begin`/`end` pairs. Timings
//! accumulate over a stats window and are published as an [`EngineStats`]
//! snapshot when the window closes. Nothing here feeds back into control flow.

use super::time::Stopwatch;

/// Published timing tree for one named phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceNode {
    /// Phase name
    pub name: String,
    /// Wall-clock milliseconds spent in this phase during the window
    pub total_ms: f64,
    /// Number of times the phase ran during the window
    pub calls: u32,
    /// Nested phases in first-seen order
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    /// Find a direct child by name
    pub fn child(&self, name: &str) -> Option<&TraceNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Find a descendant by a `/`-separated path, e.g. `"frame/render"`
    pub fn find(&self, path: &str) -> Option<&TraceNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.child(segment))
    }
}

/// Diagnostics snapshot refreshed at the configured interval
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineStats {
    /// Frames per second over the last window
    pub fps: f32,
    /// Total frames run
    pub frame_count: u64,
    /// Total frames that actually rendered
    pub rendered_frames: u64,
    /// Timing tree for the last window
    pub trace: TraceNode,
}

#[derive(Debug)]
struct NodeData {
    name: String,
    children: Vec<usize>,
    total_ms: f64,
    calls: u32,
}

impl NodeData {
    fn new(name: &str) -> Self {
        Self { name: name.to_string(), children: Vec::new(), total_ms: 0.0, calls: 0 }
    }
}

/// Hierarchical wall-clock profiler
#[derive(Debug)]
pub struct Profiler {
    nodes: Vec<NodeData>,
    stack: Vec<(usize, Stopwatch)>,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    /// Create a profiler with an empty root
    pub fn new() -> Self {
        Self { nodes: vec![NodeData::new("root")], stack: Vec::new() }
    }

    /// Open a phase nested under the currently open one
    pub fn begin(&mut self, name: &str) {
        let parent = self.stack.last().map_or(0, |(index, _)| *index);
        let existing = self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].name == name);
        let index = existing.unwrap_or_else(|| {
            self.nodes.push(NodeData::new(name));
            let index = self.nodes.len() - 1;
            self.nodes[parent].children.push(index);
            index
        });
        self.stack.push((index, Stopwatch::start_new()));
    }

    /// Close the innermost open phase; unmatched calls are ignored
    pub fn end(&mut self) {
        if let Some((index, mut stopwatch)) = self.stack.pop() {
            stopwatch.stop();
            let node = &mut self.nodes[index];
            node.total_ms += stopwatch.elapsed_millis();
            node.calls += 1;
        } else {
            log::trace!("Profiler::end called with no open phase");
        }
    }

    /// Run `f` inside a named phase
    pub fn scope<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin(name);
        let result = f(self);
        self.end();
        result
    }

    /// Depth of currently open phases
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Build the published tree from the accumulated timings
    pub fn snapshot(&self) -> TraceNode {
        self.build(0)
    }

    fn build(&self, index: usize) -> TraceNode {
        let node = &self.nodes[index];
        TraceNode {
            name: node.name.clone(),
            total_ms: node.total_ms,
            calls: node.calls,
            children: node.children.iter().map(|&child| self.build(child)).collect(),
        }
    }

    /// Zero every accumulated timing; the phase structure is kept
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.total_ms = 0.0;
            node.calls = 0;
        }
    }
}
