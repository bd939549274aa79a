//! Dialogue engine
//!
//! (現在のセッション, 受信メッセージ) → (次のセッション, 返信) の遷移
//! 関数。フェーズ遷移と無料/有料のゲーティングはすべてここが持つ。
//! 入力セッションは変更しない。生成呼び出しが失敗した遷移はエラーに
//! なり、呼び出し側は何もコミットしない。

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::llm::ReadingGenerator;
use crate::session::Session;

use super::intent::{classify, Intent};
use super::messages;
use super::phase::{Phase, Topic};
use super::plan::{PaymentLinks, Plan};

/// One completed transition: the session to commit and the replies to send
#[derive(Debug, Clone)]
pub struct Turn {
    pub session: Session,
    pub replies: Vec<String>,
}

impl Turn {
    fn new(session: Session, replies: Vec<String>) -> Self {
        Self { session, replies }
    }
}

/// 有料フェーズでの鑑定依頼。テキスト相談と手相写真の2種類。
enum PaidRequest<'a> {
    Text(&'a str),
    Image(&'a [u8]),
}

/// The dialogue state machine
pub struct DialogueEngine {
    generator: Arc<dyn ReadingGenerator>,
    links: PaymentLinks,
}

impl DialogueEngine {
    pub fn new(generator: Arc<dyn ReadingGenerator>, links: PaymentLinks) -> Self {
        Self { generator, links }
    }

    /// Advance the dialogue with one text message
    pub async fn handle_text(&self, session: &Session, text: &str) -> Result<Turn> {
        let text = text.trim();
        let intent = classify(text);
        debug!(user_id = %session.user_id, phase = ?session.phase, ?intent, "transition");

        // リセットはどのフェーズからでも効く
        if intent == Intent::Reset {
            return Ok(self.reset_turn(session));
        }

        match session.phase {
            Phase::Start => Ok(self.on_start(session, intent)),
            Phase::Menu => Ok(self.on_menu(session, intent)),
            Phase::Hearing => self.on_hearing(session, text).await,
            Phase::FreeDone => Ok(self.on_free_done(session)),
            Phase::SelectPlan => Ok(self.on_select_plan(session, intent)),
            Phase::WaitingPayment => Ok(self.on_waiting_payment(session, intent)),
            Phase::Paid => self.on_paid(session, PaidRequest::Text(text)).await,
            Phase::Done => Ok(self.reset_turn(session)),
        }
    }

    /// Advance the dialogue with a photo (palm readings)
    pub async fn handle_image(&self, session: &Session, jpeg: &[u8]) -> Result<Turn> {
        debug!(user_id = %session.user_id, phase = ?session.phase, "image transition");

        match session.phase {
            Phase::Paid => self.on_paid(session, PaidRequest::Image(jpeg)).await,
            _ if !session.free_used => self.free_palm_reading(session, jpeg).await,
            Phase::FreeDone => Ok(self.on_free_done(session)),
            _ => Ok(Turn::new(
                session.next(),
                vec![messages::PLAN_GUIDE_SHORT.to_string()],
            )),
        }
    }

    fn reset_turn(&self, session: &Session) -> Turn {
        let mut next = session.next();
        next.reset();
        Turn::new(next, vec![messages::RESET_DONE.to_string()])
    }

    /// 初回メッセージ。トピックを含んでいればメニューを飛ばして
    /// そのままヒアリングへ入る。
    fn on_start(&self, session: &Session, intent: Intent) -> Turn {
        match selected_topic(intent) {
            Some(topic) => self.begin_hearing(session, topic),
            None => {
                let mut next = session.next();
                next.phase = Phase::Menu;
                Turn::new(next, vec![messages::MAIN_MENU.to_string()])
            }
        }
    }

    fn on_menu(&self, session: &Session, intent: Intent) -> Turn {
        match selected_topic(intent) {
            Some(topic) => self.begin_hearing(session, topic),
            // 不一致は黙殺せず必ず再提示する
            None => Turn::new(session.next(), vec![messages::menu_reprompt()]),
        }
    }

    fn begin_hearing(&self, session: &Session, topic: Topic) -> Turn {
        let mut next = session.next();
        next.phase = Phase::Hearing;
        next.topic = Some(topic);
        next.answers.clear();

        let set = messages::question_set(topic);
        let first = format!("{}\n\n{}", set.intro, set.questions[0]);
        Turn::new(next, vec![first])
    }

    async fn on_hearing(&self, session: &Session, text: &str) -> Result<Turn> {
        let Some(topic) = session.topic else {
            // トピックの無いヒアリング記録はメニューからやり直す
            let mut next = session.next();
            next.phase = Phase::Menu;
            return Ok(Turn::new(next, vec![messages::MAIN_MENU.to_string()]));
        };

        let mut next = session.next();
        next.answers.push(text.to_string());

        if next.answers.len() < topic.question_count() {
            let question = messages::question_set(topic).questions[next.answers.len()];
            return Ok(Turn::new(next, vec![question.to_string()]));
        }

        // 回答が揃った。free_used とフェーズは生成が成功してから確定する。
        let prompt = messages::free_reading_prompt(topic, &next.answers);
        let reading = self.generator.generate(&prompt).await?;

        next.free_used = true;
        next.phase = Phase::FreeDone;
        info!(user_id = %next.user_id, topic = topic.label(), "free reading delivered");
        Ok(Turn::new(
            next,
            vec![reading, messages::FREE_DONE_FOLLOWUP.to_string()],
        ))
    }

    /// 無料の手相鑑定。ヒアリング完了と同じく、生成成功までは何も記録しない。
    async fn free_palm_reading(&self, session: &Session, jpeg: &[u8]) -> Result<Turn> {
        let reading = self
            .generator
            .generate_with_image(messages::PALM_PROMPT, jpeg)
            .await?;

        let mut next = session.next();
        next.topic = Some(Topic::Palm);
        next.free_used = true;
        next.phase = Phase::FreeDone;
        info!(user_id = %next.user_id, "free palm reading delivered");
        Ok(Turn::new(
            next,
            vec![reading, messages::FREE_DONE_FOLLOWUP.to_string()],
        ))
    }

    fn on_free_done(&self, session: &Session) -> Turn {
        let mut next = session.next();
        next.phase = Phase::SelectPlan;
        Turn::new(
            next,
            vec![
                messages::PLAN_GUIDE_SHORT.to_string(),
                messages::PLAN_GUIDE_LONG.to_string(),
            ],
        )
    }

    fn on_select_plan(&self, session: &Session, intent: Intent) -> Turn {
        let plan = match intent {
            Intent::Plan(plan) => Some(plan),
            Intent::Number(n) => Plan::from_number(n),
            _ => None,
        };

        if let Some(plan) = plan {
            let mut next = session.next();
            next.selected_plan = Some(plan);
            next.phase = Phase::WaitingPayment;
            let checkout = messages::checkout_text(plan, self.links.url(plan));
            return Turn::new(next, vec![checkout]);
        }

        if intent == Intent::Recommend {
            return Turn::new(session.next(), vec![messages::RECOMMEND.to_string()]);
        }

        // 不一致は黙殺せず必ず再提示する
        Turn::new(session.next(), vec![messages::PLAN_GUIDE_SHORT.to_string()])
    }

    fn on_waiting_payment(&self, session: &Session, intent: Intent) -> Turn {
        if intent == Intent::PaymentConfirmed {
            let mut next = session.next();
            next.phase = Phase::Paid;
            return Turn::new(next, vec![messages::PURCHASED_START.to_string()]);
        }

        Turn::new(session.next(), vec![messages::PAYMENT_REPROMPT.to_string()])
    }

    /// 有料フェーズ。回数を使い切っていれば提供せずプラン選択へ戻し、
    /// 残っていれば生成成功後にカウントを進める。
    async fn on_paid(&self, session: &Session, request: PaidRequest<'_>) -> Result<Turn> {
        let Some(plan) = session.selected_plan else {
            // プラン未設定の有料記録はプラン選択からやり直す
            let mut next = session.next();
            next.phase = Phase::SelectPlan;
            return Ok(Turn::new(
                next,
                vec![messages::PLAN_GUIDE_SHORT.to_string()],
            ));
        };

        if session.used_count >= plan.quota() {
            let mut next = session.next();
            next.phase = Phase::SelectPlan;
            next.selected_plan = None;
            next.used_count = 0;
            info!(user_id = %next.user_id, plan = plan.label(), "quota exhausted");
            return Ok(Turn::new(
                next,
                vec![
                    messages::quota_exhausted_text(plan),
                    messages::PLAN_GUIDE_SHORT.to_string(),
                ],
            ));
        }

        let reading = match request {
            PaidRequest::Text(text) => {
                self.generator
                    .generate(&messages::consultation_prompt(text))
                    .await?
            }
            PaidRequest::Image(jpeg) => {
                self.generator
                    .generate_with_image(messages::PALM_PROMPT, jpeg)
                    .await?
            }
        };

        let mut next = session.next();
        next.used_count += 1;
        info!(
            user_id = %next.user_id,
            plan = plan.label(),
            used = next.used_count,
            "paid reading delivered"
        );
        Ok(Turn::new(next, vec![reading]))
    }
}

fn selected_topic(intent: Intent) -> Option<Topic> {
    match intent {
        Intent::Topic(topic) => Some(topic),
        Intent::Number(n) => Topic::from_number(n),
        _ => None,
    }
}
