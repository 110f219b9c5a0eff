use std::collections::HashMap;

use chrono::{DateTime, Utc};
use eframe::egui::Vec2;

use crate::api::{OwnerType, Snapshot};

use super::layout::{Canvas, layout_network};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Org(i64),
    User(i64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrgNode {
    pub id: i64,
    pub name: String,
    pub credential: String,
    pub created_at: DateTime<Utc>,
    pub position: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserNode {
    pub id: i64,
    pub user_id: i64,
    pub owner_org_id: Option<i64>,
    pub address: String,
    pub balance: f64,
    pub position: Vec2,
}

#[derive(Clone, Debug, Default)]
pub struct NetworkGraph {
    canvas: Canvas,
    orgs: Vec<OrgNode>,
    users: Vec<UserNode>,
    org_index: HashMap<i64, usize>,
    user_index: HashMap<i64, usize>,
    address_index: HashMap<String, NodeKey>,
    org_balances: HashMap<i64, f64>,
}

impl NetworkGraph {
    pub fn empty(canvas: Canvas) -> Self {
        Self {
            canvas,
            ..Self::default()
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot, canvas: Canvas) -> Self {
        let user_wallets = snapshot
            .wallets
            .iter()
            .filter(|wallet| wallet.owner_type == OwnerType::User)
            .collect::<Vec<_>>();
        let layout = layout_network(
            snapshot.companies.iter().map(|company| company.id),
            user_wallets.iter().map(|wallet| (wallet.owner_id, wallet.id)),
            canvas,
        );

        let mut orgs = snapshot
            .companies
            .iter()
            .filter_map(|company| {
                let position = *layout.orgs.get(&company.id)?;
                Some(OrgNode {
                    id: company.id,
                    name: company.name.clone(),
                    credential: company.api_key.clone(),
                    created_at: company.created_at,
                    position,
                })
            })
            .collect::<Vec<_>>();
        orgs.sort_by_key(|org| org.id);
        orgs.dedup_by_key(|org| org.id);

        let mut users = user_wallets
            .iter()
            .filter_map(|wallet| {
                let position = *layout.users.get(&wallet.id)?;
                Some(UserNode {
                    id: wallet.id,
                    user_id: wallet.owner_id,
                    owner_org_id: wallet.company_id,
                    address: wallet.address.clone(),
                    balance: wallet.balance,
                    position,
                })
            })
            .collect::<Vec<_>>();
        users.sort_by_key(|user| (user.user_id, user.id));
        users.dedup_by_key(|user| user.id);

        let org_index = orgs
            .iter()
            .enumerate()
            .map(|(index, org)| (org.id, index))
            .collect::<HashMap<_, _>>();
        let user_index = users
            .iter()
            .enumerate()
            .map(|(index, user)| (user.id, index))
            .collect::<HashMap<_, _>>();

        let mut address_index = HashMap::with_capacity(snapshot.wallets.len());
        let mut org_balances: HashMap<i64, f64> = HashMap::new();
        for wallet in &snapshot.wallets {
            match wallet.owner_type {
                OwnerType::Company if org_index.contains_key(&wallet.owner_id) => {
                    address_index.insert(wallet.address.clone(), NodeKey::Org(wallet.owner_id));
                    *org_balances.entry(wallet.owner_id).or_default() += wallet.balance;
                }
                OwnerType::Company => {}
                OwnerType::User => {
                    if user_index.contains_key(&wallet.id) {
                        address_index.insert(wallet.address.clone(), NodeKey::User(wallet.id));
                    }
                }
            }
        }

        let mut graph = Self {
            canvas,
            orgs,
            users,
            org_index,
            user_index,
            address_index,
            org_balances,
        };
        graph.infer_owner_orgs(snapshot);
        graph
    }

    // Wallet listings do not always carry the owning organization; the first
    // organization that paid into a user wallet is taken as its owner.
    fn infer_owner_orgs(&mut self, snapshot: &Snapshot) {
        let mut transfers = snapshot.transfers.iter().collect::<Vec<_>>();
        transfers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        for transfer in transfers {
            let (Some(from), Some(to)) = (
                transfer.from_address.as_deref().and_then(|address| self.resolve(address)),
                transfer.to_address.as_deref().and_then(|address| self.resolve(address)),
            ) else {
                continue;
            };

            if let (NodeKey::Org(org_id), NodeKey::User(wallet_id)) = (from, to)
                && let Some(&index) = self.user_index.get(&wallet_id)
                && self.users[index].owner_org_id.is_none()
            {
                self.users[index].owner_org_id = Some(org_id);
            }
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn orgs(&self) -> &[OrgNode] {
        &self.orgs
    }

    pub fn users(&self) -> &[UserNode] {
        &self.users
    }

    pub fn node_count(&self) -> usize {
        self.orgs.len() + self.users.len()
    }

    pub fn org(&self, id: i64) -> Option<&OrgNode> {
        self.org_index.get(&id).map(|&index| &self.orgs[index])
    }

    pub fn user(&self, wallet_id: i64) -> Option<&UserNode> {
        self.user_index.get(&wallet_id).map(|&index| &self.users[index])
    }

    pub fn org_balance(&self, id: i64) -> f64 {
        self.org_balances.get(&id).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        match key {
            NodeKey::Org(id) => self.org_index.contains_key(&id),
            NodeKey::User(id) => self.user_index.contains_key(&id),
        }
    }

    pub fn resolve(&self, address: &str) -> Option<NodeKey> {
        self.address_index.get(address).copied()
    }

    pub fn position(&self, key: NodeKey) -> Option<Vec2> {
        match key {
            NodeKey::Org(id) => self.org(id).map(|org| org.position),
            NodeKey::User(id) => self.user(id).map(|user| user.position),
        }
    }

    pub fn resolve_position(&self, address: Option<&str>) -> Option<(NodeKey, Vec2)> {
        let key = self.resolve(address?)?;
        Some((key, self.position(key)?))
    }

    pub fn label(&self, key: NodeKey) -> String {
        match key {
            NodeKey::Org(id) => self
                .org(id)
                .map(|org| org.name.clone())
                .unwrap_or_else(|| format!("Org {id}")),
            NodeKey::User(id) => self
                .user(id)
                .map(|user| format!("User #{}", user.user_id))
                .unwrap_or_else(|| "User".to_owned()),
        }
    }

    pub fn owner_name(&self, user: &UserNode) -> &str {
        user.owner_org_id
            .and_then(|id| self.org(id))
            .map(|org| org.name.as_str())
            .unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::{company, company_wallet, snapshot, transfer, user_wallet};

    #[test]
    fn resolves_company_and_user_wallets() {
        let graph = NetworkGraph::from_snapshot(
            &snapshot(
                vec![company(1, "Acme")],
                vec![company_wallet(10, 1, "w_acme"), user_wallet(11, 5, "w_alice")],
                vec![],
            ),
            Canvas::default(),
        );

        assert_eq!(graph.resolve("w_acme"), Some(NodeKey::Org(1)));
        assert_eq!(graph.resolve("w_alice"), Some(NodeKey::User(11)));
        assert_eq!(graph.resolve("w_missing"), None);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn company_wallet_of_unknown_company_does_not_resolve() {
        let graph = NetworkGraph::from_snapshot(
            &snapshot(vec![], vec![company_wallet(10, 99, "w_orphan")], vec![]),
            Canvas::default(),
        );

        assert_eq!(graph.resolve("w_orphan"), None);
    }

    #[test]
    fn positions_survive_reordered_snapshots() {
        let companies = vec![company(1, "Acme"), company(2, "Globex"), company(3, "Initech")];
        let wallets = vec![user_wallet(11, 5, "w_a"), user_wallet(12, 6, "w_b")];

        let first = NetworkGraph::from_snapshot(
            &snapshot(companies.clone(), wallets.clone(), vec![]),
            Canvas::default(),
        );
        let second = NetworkGraph::from_snapshot(
            &snapshot(
                companies.into_iter().rev().collect(),
                wallets.into_iter().rev().collect(),
                vec![],
            ),
            Canvas::default(),
        );

        let keys = [
            NodeKey::Org(1),
            NodeKey::Org(2),
            NodeKey::Org(3),
            NodeKey::User(11),
            NodeKey::User(12),
        ];
        for key in keys {
            assert_eq!(first.position(key), second.position(key));
        }
    }

    #[test]
    fn infers_owner_from_first_paying_org() {
        let graph = NetworkGraph::from_snapshot(
            &snapshot(
                vec![company(1, "Acme"), company(2, "Globex")],
                vec![
                    company_wallet(10, 1, "w_acme"),
                    company_wallet(20, 2, "w_globex"),
                    user_wallet(11, 5, "w_alice"),
                ],
                vec![
                    transfer(2, "tx2", Some("w_globex"), Some("w_alice"), 60),
                    transfer(1, "tx1", Some("w_acme"), Some("w_alice"), 0),
                ],
            ),
            Canvas::default(),
        );

        let alice = graph.user(11).unwrap();
        assert_eq!(alice.owner_org_id, Some(1));
        assert_eq!(graph.owner_name(alice), "Acme");
    }

    #[test]
    fn explicit_owner_wins_over_inference() {
        let mut wallet = user_wallet(11, 5, "w_alice");
        wallet.company_id = Some(2);
        let graph = NetworkGraph::from_snapshot(
            &snapshot(
                vec![company(1, "Acme"), company(2, "Globex")],
                vec![company_wallet(10, 1, "w_acme"), wallet],
                vec![transfer(1, "tx1", Some("w_acme"), Some("w_alice"), 0)],
            ),
            Canvas::default(),
        );

        assert_eq!(graph.user(11).unwrap().owner_org_id, Some(2));
    }
}
