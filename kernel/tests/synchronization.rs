//! Semaphore and message-passing flows through System

use procsim_kernel::config::{ArenaConfig, SEMAPHORE_QUEUE_CAPACITY};
use procsim_kernel::{Acquire, Error, Pid, ProcessState, System};

fn system() -> System {
    System::new(ArenaConfig::default()).unwrap()
}

fn state(system: &System, pid: Pid) -> ProcessState {
    system.process_info(pid).unwrap().state
}

#[test]
fn two_waiters_released_in_order() {
    let mut system = system();
    system.new_semaphore(0, 0).unwrap();
    let a = system.create(1).unwrap();
    let b = system.create(1).unwrap();

    assert_eq!(system.sem_p(0), Ok(Acquire::Blocked));
    assert_eq!(system.current(), Some(b));
    assert_eq!(system.sem_p(0), Ok(Acquire::Blocked));
    assert_eq!(system.current(), Some(Pid(1)));
    assert_eq!(system.semaphore(0).unwrap().value(), -2);

    assert_eq!(system.sem_v(0), Ok(Some(a)));
    assert_eq!(system.current(), Some(a));
    assert_eq!(system.sem_v(0), Ok(Some(b)));
    assert_eq!(state(&system, b), ProcessState::Ready);
    assert_eq!(system.snapshot().ready[1], vec![b]);
    assert_eq!(system.semaphore(0).unwrap().value(), 0);
}

#[test]
fn mutual_exclusion_hand_off() {
    let mut system = system();
    system.new_semaphore(1, 1).unwrap();
    let a = system.create(0).unwrap();
    let b = system.create(0).unwrap();

    // a takes the lock and is preempted; b must wait for it.
    assert_eq!(system.sem_p(1), Ok(Acquire::Proceeded));
    assert_eq!(system.quantum(), Ok(b));
    assert_eq!(system.sem_p(1), Ok(Acquire::Blocked));
    assert_eq!(system.current(), Some(a));

    assert_eq!(system.sem_v(1), Ok(Some(b)));
    assert_eq!(system.semaphore(1).unwrap().value(), 0);
    assert_eq!(system.quantum(), Ok(b));
}

#[test]
fn full_wait_queue_is_reported() {
    let mut system = system();
    system.new_semaphore(4, 0).unwrap();
    for _ in 0..SEMAPHORE_QUEUE_CAPACITY {
        system.create(1).unwrap();
        assert_eq!(system.sem_p(4), Ok(Acquire::Blocked));
    }

    let extra = system.create(1).unwrap();
    assert_eq!(system.sem_p(4), Err(Error::CapacityExceeded));
    assert_eq!(state(&system, extra), ProcessState::Running);
    assert_eq!(
        system.semaphore(4).unwrap().value(),
        -(SEMAPHORE_QUEUE_CAPACITY as i32)
    );
}

#[test]
fn client_server_exchange() {
    let mut system = system();
    let server = system.create(1).unwrap();
    let client = system.create(1).unwrap();

    // Server waits for work.
    assert_eq!(system.receive(), Ok(None));
    assert_eq!(system.current(), Some(client));

    // Client sends; server wakes, client blocks for the reply.
    system.send(server, "request").unwrap();
    assert_eq!(state(&system, client), ProcessState::BlockedOnSend);
    assert_eq!(system.current(), Some(server));

    let request = system.receive().unwrap().unwrap();
    assert_eq!((request.text(), request.sender()), ("request", client));
    system.reply(client, "response").unwrap();

    assert_eq!(system.quantum(), Ok(client));
    let response = system.receive().unwrap().unwrap();
    assert_eq!((response.text(), response.sender()), ("response", server));
}

#[test]
fn overlong_messages_are_truncated() {
    let mut system = system();
    let a = system.create(1).unwrap();
    let b = system.create(1).unwrap();

    system.send(b, &"z".repeat(64)).unwrap();
    let message = system.receive().unwrap().unwrap();
    assert_eq!(message.text().len(), 39);
    assert_eq!(message.sender(), a);
}
