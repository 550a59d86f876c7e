use std::fs;
use std::sync::Arc;

use kov::agent::{MAX_EXECUTIONS, MAX_FAILURES, Termination};
use kov::context::Context;
use kov::error::LlmError;
use kov::llm::{ChatModel, Message, Role};
use kov::policy::{PolicyTable, ToolPolicy};
use kov::protocol::classifier::{IntentClassifier, LlmClassifier, keyword_intent};
use kov::protocol::planner::Planner;
use kov::protocol::{Intent, IntentCategory, Plan};
use kov::sandbox::Workspace;
use kov::testing::{ScriptedConfirmer, ScriptedModel};
use kov::tools::{ToolId, Toolset};
use kov::Agent;
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
    model: Arc<ScriptedModel>,
    confirmer: Arc<ScriptedConfirmer>,
}

impl Harness {
    fn new(replies: &[&str], answers: &[bool]) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            model: ScriptedModel::new(replies.iter().copied()),
            confirmer: ScriptedConfirmer::new(answers.iter().copied()),
        }
    }

    fn agent(&self) -> Agent {
        self.agent_with(|context| context)
    }

    fn agent_with(&self, configure: impl FnOnce(Context) -> Context) -> Agent {
        let workspace = Workspace::new(self.dir.path()).unwrap();
        let context = configure(Context::new(Toolset::new(workspace, self.confirmer.clone())));
        Agent::new(self.model.clone(), context, self.confirmer.clone())
    }

    fn touch(&self, name: &str) {
        fs::write(self.dir.path().join(name), name).unwrap();
    }
}

fn plan_reply(steps: usize, tools: &str) -> String {
    let steps = (1..=steps)
        .map(|i| format!("step {i}"))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("GOAL: do the thing\nSTEPS: {steps}\nTOOLS: {tools}\nCOMPLEXITY: 2")
}

#[test]
fn listing_reports_last_successful_output() {
    let plan = plan_reply(1, "list_directory_tool");
    let h = Harness::new(&["COMMAND|0.9|list the files", plan.as_str()], &[]);
    h.touch("b.txt");
    h.touch("a.txt");

    let report = h.agent().run_turn("show the files here").unwrap();

    assert_eq!(report.intent.category, IntentCategory::Command);
    assert_eq!(report.executions.len(), 1);
    assert_eq!(report.termination, Termination::GoalAchieved);
    assert_eq!(report.response, "Task completed successfully!\n\na.txt\nb.txt");
}

#[test]
fn reasoning_only_skips_planner_and_tools() {
    let h = Harness::new(&["REASONING_ONLY|0.95|wants a joke", "Why did the crab cross?"], &[]);

    let report = h.agent().run_turn("tell me a joke").unwrap();

    assert_eq!(report.response, "Why did the crab cross?");
    assert_eq!(report.termination, Termination::Reasoned);
    assert!(report.executions.is_empty());

    assert_eq!(h.model.call_count(), 2, "classifier and answer only");
    let calls = h.model.calls();
    assert_eq!(calls[1][0].role, Role::System);
    assert!(calls[1][0].content.starts_with("You are KOV"));
    assert_eq!(calls[1][1], Message::human("tell me a joke"));
}

#[test]
fn plan_without_tools_answers_first_step() {
    let plan = plan_reply(3, "none");
    let h = Harness::new(&["QUESTION|0.8|asks", plan.as_str(), "Forty-two."], &[]);

    let report = h.agent().run_turn("what is the answer").unwrap();

    assert_eq!(report.response, "Forty-two.");
    assert_eq!(report.termination, Termination::Reasoned);
    let calls = h.model.calls();
    assert_eq!(calls[2][0].content, "Complete this step: step 1");
}

#[test]
fn failures_stop_the_turn_at_three() {
    let plan = plan_reply(12, "read_file_tool");
    let h = Harness::new(&["COMMAND|0.9|read", plan.as_str()], &[]);

    let report = h.agent().run_turn("read missing.txt").unwrap();

    assert_eq!(report.executions.len(), MAX_FAILURES);
    assert!(report.executions.iter().all(|e| !e.success));
    assert_eq!(report.termination, Termination::TooManyFailures);
    assert_eq!(
        report.response,
        "I couldn't complete your request:\n- file not found: missing.txt"
    );
}

#[test]
fn executions_stop_at_safety_limit() {
    let plan = plan_reply(12, "list_directory_tool");
    let h = Harness::new(&["COMMAND|0.9|list", plan.as_str()], &[]);
    h.touch("a.txt");

    let report = h.agent().run_turn("list files in .").unwrap();

    assert_eq!(report.executions.len(), MAX_EXECUTIONS);
    assert_eq!(report.termination, Termination::SafetyLimit);
}

#[test]
fn positional_tools_fall_back_to_first() {
    let plan = plan_reply(3, "write_file_tool | read_file_tool");
    let h = Harness::new(&["MULTI_STEP_TASK|0.8|write then read", plan.as_str()], &[]);

    let report = h.agent().run_turn("create notes.txt with hello").unwrap();

    let tools: Vec<&str> = report.executions.iter().map(|e| e.tool_name.as_str()).collect();
    assert_eq!(tools, ["write_file_tool", "read_file_tool", "write_file_tool"]);
    let outcomes: Vec<bool> = report.executions.iter().map(|e| e.success).collect();
    // The read step takes the last word of the request as its path.
    assert_eq!(outcomes, [true, false, true]);
    assert_eq!(
        fs::read_to_string(h.dir.path().join("notes.txt")).unwrap(),
        "hello"
    );
    assert!(report.response.starts_with("Task completed successfully!\n\n"));
    assert!(report.response.ends_with("notes.txt"));
}

#[test]
fn forbidden_tool_is_refused_without_running() {
    let plan = plan_reply(1, "list_directory_tool");
    let h = Harness::new(&["COMMAND|0.9|list", plan.as_str()], &[]);

    let agent = h.agent_with(|c| c.with_policy(ToolId::ListDirectory, ToolPolicy::Forbidden));
    let report = agent.run_turn("list files").unwrap();

    assert_eq!(report.executions.len(), 1);
    assert_eq!(
        report.executions[0].error.as_deref(),
        Some("tool 'list_directory_tool' is forbidden by policy")
    );
    assert!(report.executions[0].output.is_none());
    assert!(h.confirmer.prompts().is_empty());
}

#[test]
fn declined_confirmation_leaves_file() {
    let plan = plan_reply(1, "delete_file_tool");
    let h = Harness::new(&["COMMAND|0.9|delete", plan.as_str()], &[false]);
    h.touch("old.log");

    let report = h.agent().run_turn("delete old.log").unwrap();

    assert!(h.dir.path().join("old.log").exists());
    assert_eq!(report.executions[0].error.as_deref(), Some("cancelled"));
    assert_eq!(h.confirmer.prompts(), vec!["Execute delete_file_tool?".to_string()]);
    assert_eq!(report.response, "I couldn't complete your request:\n- cancelled");
}

#[test]
fn confirmed_delete_asks_twice() {
    let plan = plan_reply(1, "delete_file_tool");
    let h = Harness::new(&["COMMAND|0.9|delete", plan.as_str()], &[true, true]);
    h.touch("old.log");

    let report = h.agent().run_turn("delete old.log").unwrap();

    assert!(report.executions[0].success);
    assert!(!h.dir.path().join("old.log").exists());
    assert_eq!(h.confirmer.prompts().len(), 2);
}

#[test]
fn unknown_tool_counts_as_failure() {
    let plan = plan_reply(1, "summon_tool");
    let h = Harness::new(&["TOOL_REQUEST|0.9|summon", plan.as_str()], &[]);

    let report = h.agent().run_turn("summon a demon").unwrap();

    assert_eq!(report.executions.len(), 1);
    assert_eq!(report.executions[0].tool_name, "summon_tool");
    assert_eq!(report.executions[0].error.as_deref(), Some("tool not found: summon_tool"));
    assert_eq!(report.termination, Termination::GoalAchieved);
}

#[cfg(unix)]
#[test]
fn failed_command_is_a_failed_execution() {
    let plan = plan_reply(1, "run_shell_tool");
    let h = Harness::new(&["TOOL_REQUEST|0.9|run", plan.as_str()], &[true]);

    let report = h.agent().run_turn("run ls definitely-missing").unwrap();

    let execution = &report.executions[0];
    assert!(!execution.success);
    let meta = &execution.output.as_ref().unwrap().meta;
    assert_eq!(meta["succeeded"], false);
    assert_eq!(meta["command"], "ls");
    assert_eq!(meta["argv"], serde_json::json!(["ls", "definitely-missing"]));
}

#[test]
fn classifier_is_deterministic_for_equal_replies() {
    let model = ScriptedModel::new(["garbage", "garbage"]);
    let classifier = LlmClassifier::new(model);

    let first = classifier.classify("create a file");
    let second = classifier.classify("create a file");
    assert_eq!(first, second);
    assert_eq!(first.category, IntentCategory::Command);
    assert_eq!(first.confidence, 0.7);
}

#[test]
fn model_failure_on_answer_becomes_error_text() {
    let h = Harness {
        dir: tempfile::tempdir().unwrap(),
        model: ScriptedModel::failing(500),
        confirmer: ScriptedConfirmer::new([]),
    };

    let text = h.agent().run("tell me a joke");
    assert_eq!(text, "Error: model backend returned status 500");
}

struct PanickingModel;

impl ChatModel for PanickingModel {
    fn complete(&self, _messages: &[Message]) -> Result<String, LlmError> {
        panic!("backend exploded")
    }
}

#[test]
fn run_never_panics() {
    let dir = tempfile::tempdir().unwrap();
    let confirmer = ScriptedConfirmer::new([]);
    let workspace = Workspace::new(dir.path()).unwrap();
    let agent = Agent::new(
        Arc::new(PanickingModel),
        Context::new(Toolset::new(workspace, confirmer.clone())),
        confirmer,
    );

    let text = agent.run("anything at all");
    assert_eq!(text, "Error: internal fault: backend exploded");
}

struct KeywordClassifier;

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, input: &str) -> Intent {
        keyword_intent(input)
    }
}

struct FixedPlanner(Plan);

impl Planner for FixedPlanner {
    fn generate_plan(&self, _input: &str, _intent: &Intent) -> Plan {
        self.0.clone()
    }
}

#[cfg(unix)]
#[test]
fn uniform_auto_execute_runs_shell_without_prompting() {
    let h = Harness::new(&[], &[]);
    let plan = Plan {
        steps: vec!["run the command".into()],
        tools_needed: vec!["run_shell_tool".into()],
        ..Plan::default()
    };
    let agent = h
        .agent_with(|c| c.with_policies(PolicyTable::uniform(ToolPolicy::AutoExecute)))
        .with_classifier(Box::new(KeywordClassifier))
        .with_planner(Box::new(FixedPlanner(plan)));

    let report = agent.run_turn("run echo hello").unwrap();

    assert_eq!(report.intent.category, IntentCategory::ToolRequest);
    assert_eq!(report.response, "Task completed successfully!\n\nhello");
    assert!(h.confirmer.prompts().is_empty());
    assert_eq!(h.model.call_count(), 0);
}

#[test]
fn uniform_forbidden_refuses_every_step() {
    let h = Harness::new(&[], &[]);
    let plan = Plan {
        steps: vec!["a".into(), "b".into()],
        tools_needed: vec!["read_file_tool".into(), "list_directory_tool".into()],
        ..Plan::default()
    };
    let agent = h
        .agent_with(|c| c.with_policies(PolicyTable::uniform(ToolPolicy::Forbidden)))
        .with_classifier(Box::new(KeywordClassifier))
        .with_planner(Box::new(FixedPlanner(plan)));

    let report = agent.run_turn("create a list").unwrap();

    assert_eq!(report.executions.len(), 2);
    assert!(report.executions.iter().all(|e| e.output.is_none()));
    assert_eq!(report.termination, Termination::GoalAchieved);
}
